// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group-by with per-column aggregation.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use tabula_core::{AggregateOp, Column, ColumnRef, RowKey, Table, Value};

use crate::OpsError;

/// The function an aggregate field applies to each group's sub-column.
pub enum Reducer<'a> {
    /// A built-in aggregate.
    Op(AggregateOp),
    /// A caller-supplied aggregate.
    Custom(Box<dyn Fn(&Column) -> Value + 'a>),
}

impl Reducer<'_> {
    /// Applies the reducer to one group's values.
    pub fn apply(&self, column: &Column) -> Value {
        match self {
            Self::Op(op) => op.apply(column),
            Self::Custom(f) => f(column),
        }
    }
}

impl From<AggregateOp> for Reducer<'_> {
    fn from(op: AggregateOp) -> Self {
        Self::Op(op)
    }
}

impl fmt::Debug for Reducer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op(op) => f.debug_tuple("Op").field(op).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A single aggregated output field.
#[derive(Debug)]
struct AggregateField<'a> {
    input: String,
    output: String,
    reducer: Reducer<'a>,
}

/// A group-by descriptor over one table.
///
/// Rows are partitioned by the composite [`RowKey`] of the key columns. Each key column is
/// registered as an output column of the same name holding the group's first value; further
/// fields are registered with [`GroupBy::apply`] / [`GroupBy::apply_with`]. Output columns are
/// the key columns (in order) followed by the applied fields (in order).
///
/// Output rows follow hash-map order: they are **not** guaranteed to match input order or to be
/// stable between runs. Within a group, rows are visited in input order, so `First`/`Last` see
/// the group's first/last row.
///
/// Unknown columns, duplicate output names and an empty key list are reported by
/// [`GroupBy::run`].
#[derive(Debug)]
pub struct GroupBy<'a> {
    table: &'a Table,
    keys: Vec<String>,
    fields: Vec<AggregateField<'a>>,
}

impl<'a> GroupBy<'a> {
    /// Groups `table` by the named key columns.
    pub fn new(table: &'a Table, keys: &[&str]) -> Self {
        let mut g = Self {
            table,
            keys: keys.iter().map(|k| String::from(*k)).collect(),
            fields: Vec::new(),
        };
        for k in keys {
            g = g.apply(k, *k, AggregateOp::First);
        }
        g
    }

    /// Adds output column `output` holding `op` applied to `input` for every group.
    pub fn apply(self, input: &str, output: impl Into<String>, op: AggregateOp) -> Self {
        self.push(input, output.into(), Reducer::Op(op))
    }

    /// Adds output column `output` holding `f` applied to `input` for every group.
    pub fn apply_with(
        self,
        input: &str,
        output: impl Into<String>,
        f: impl Fn(&Column) -> Value + 'a,
    ) -> Self {
        self.push(input, output.into(), Reducer::Custom(Box::new(f)))
    }

    /// Partitions row positions by composite key.
    ///
    /// Positions inside each group are in ascending (input) order.
    pub fn groups(&self) -> Result<HashMap<RowKey, Vec<usize>>, OpsError> {
        let key_cols = self.key_columns()?;
        let mut groups: HashMap<RowKey, Vec<usize>> = HashMap::new();
        for r in self.table.iter() {
            groups
                .entry(RowKey::from_columns(&key_cols, r.index()))
                .or_default()
                .push(r.index());
        }
        Ok(groups)
    }

    /// Computes one output row per distinct key.
    pub fn run(&self) -> Result<Table, OpsError> {
        let groups = self.groups()?;
        let inputs: Vec<ColumnRef> = self
            .fields
            .iter()
            .map(|f| self.table.get(&f.input))
            .collect::<Result<_, _>>()?;

        let mut outputs: Vec<Column> = self
            .fields
            .iter()
            .map(|_| Column::with_capacity(groups.len()))
            .collect();
        {
            let inputs: Vec<_> = inputs.iter().map(ColumnRef::borrow).collect();
            for rows in groups.values() {
                for ((field, input), out) in self.fields.iter().zip(&inputs).zip(&mut outputs) {
                    out.push(field.reducer.apply(&input.take(rows)));
                }
            }
        }

        let names = self.fields.iter().map(|f| f.output.clone());
        let table = Table::from_columns(names.zip(outputs))?;
        tracing::debug!(
            rows = self.table.len(),
            groups = table.len(),
            fields = self.fields.len(),
            "grouped table"
        );
        Ok(table)
    }

    fn push(mut self, input: &str, output: String, reducer: Reducer<'a>) -> Self {
        self.fields.push(AggregateField {
            input: String::from(input),
            output,
            reducer,
        });
        self
    }

    fn key_columns(&self) -> Result<Vec<ColumnRef>, OpsError> {
        if self.keys.is_empty() {
            tracing::warn!("group-by without key columns");
            return Err(OpsError::EmptyKeys);
        }
        Ok(self
            .keys
            .iter()
            .map(|k| self.table.get(k))
            .collect::<Result<_, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use tabula_core::FrameError;

    use super::*;

    fn sample() -> Table {
        Table::from_columns([
            ("id", Column::from_iter([1.0, 2.0, 3.0])),
            ("grp", Column::from_iter(["a", "a", "b"])),
            ("val", Column::from_iter([10.0, 20.0, 30.0])),
        ])
        .unwrap()
    }

    fn lookup(t: &Table, key: &str, value: &str, col: &str) -> Value {
        let rows: Vec<_> = t.iter().filter(|r| r.text(key) == value).collect();
        assert_eq!(rows.len(), 1, "group {value} should appear exactly once");
        rows[0].get(col)
    }

    #[test]
    fn sums_per_group() {
        let t = sample();
        let out = GroupBy::new(&t, &["grp"])
            .apply("val", "sum", AggregateOp::Sum)
            .run()
            .unwrap();
        assert_eq!(out.keys(), ["grp", "sum"]);
        assert_eq!(out.len(), 2);
        assert_eq!(lookup(&out, "grp", "a", "sum"), Value::from(30.0));
        assert_eq!(lookup(&out, "grp", "b", "sum"), Value::from(30.0));
    }

    #[test]
    fn group_counts_add_up_to_row_count() {
        let t = Table::from_columns([
            ("k1", Column::from_iter(["x", "y", "x", "y", "x", "z"])),
            ("k2", Column::from_iter([1.0, 1.0, 2.0, 1.0, 1.0, 1.0])),
            ("v", Column::from_iter([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
        ])
        .unwrap();
        for keys in [vec!["k1"], vec!["k2"], vec!["k1", "k2"]] {
            let out = GroupBy::new(&t, &keys)
                .apply("v", "n", AggregateOp::Count)
                .run()
                .unwrap();
            let total: f64 = out.iter().map(|r| r.number("n")).sum();
            assert_eq!(total, 6.0);
        }
    }

    #[test]
    fn composite_keys_split_groups() {
        let t = Table::from_columns([
            ("a", Column::from_iter(["x", "x", "x"])),
            ("b", Column::from_iter([1.0, 2.0, 1.0])),
            ("v", Column::from_iter([1.0, 2.0, 3.0])),
        ])
        .unwrap();
        let out = GroupBy::new(&t, &["a", "b"])
            .apply("v", "last", AggregateOp::Last)
            .run()
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(lookup(&out, "b", "1", "last"), Value::from(3.0));
    }

    #[test]
    fn rows_within_a_group_keep_input_order() {
        let t = sample();
        let g = GroupBy::new(&t, &["grp"]);
        let groups = g.groups().unwrap();
        let a = RowKey::from_values(&[Value::from("a")]);
        assert_eq!(groups[&a], vec![0, 1]);
    }

    #[test]
    fn missing_keys_form_their_own_group() {
        let t = Table::from_columns([
            ("k", Column::from_iter([None, Some(f64::NAN), Some(1.0)])),
            ("v", Column::from_iter([1.0, 2.0, 3.0])),
        ])
        .unwrap();
        let out = GroupBy::new(&t, &["k"])
            .apply("v", "sum", AggregateOp::Sum)
            .run()
            .unwrap();
        assert_eq!(out.len(), 2);
        let missing: Vec<_> = out.iter().filter(|r| r.get("k").is_missing()).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].number("sum"), 3.0);
    }

    #[test]
    fn custom_reducers_run_per_group() {
        let t = sample();
        let out = GroupBy::new(&t, &["grp"])
            .apply_with("id", "ids", |c| {
                let parts: Vec<_> = c.iter().map(Value::to_text).collect();
                Value::from(parts.join(","))
            })
            .run()
            .unwrap();
        assert_eq!(lookup(&out, "grp", "a", "ids"), Value::from("1,2"));
    }

    #[test]
    fn contract_violations_fail() {
        let t = sample();
        assert_eq!(
            GroupBy::new(&t, &["nope"]).run().unwrap_err(),
            OpsError::Frame(FrameError::ColumnNotFound("nope".into()))
        );
        assert_eq!(
            GroupBy::new(&t, &["grp"])
                .apply("missing", "m", AggregateOp::Sum)
                .run()
                .unwrap_err(),
            OpsError::Frame(FrameError::ColumnNotFound("missing".into()))
        );
        let no_keys = GroupBy::new(&t, &[]).run();
        assert_eq!(no_keys.unwrap_err(), OpsError::EmptyKeys);
        assert_eq!(
            GroupBy::new(&t, &["grp"])
                .apply("val", "grp", AggregateOp::Sum)
                .run()
                .unwrap_err(),
            OpsError::Frame(FrameError::DuplicateColumn("grp".into()))
        );
    }

    #[test]
    fn empty_table_yields_empty_groups() {
        let t = Table::new(["grp", "val"]).unwrap();
        let out = GroupBy::new(&t, &["grp"])
            .apply("val", "sum", AggregateOp::Sum)
            .run()
            .unwrap();
        assert_eq!(out.len(), 0);
        assert_eq!(out.keys(), ["grp", "sum"]);
    }
}
