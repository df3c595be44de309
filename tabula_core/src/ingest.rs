// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers for file-format readers that feed decoded cells into tables.
//!
//! Readers own byte-level decoding; these helpers cover the part of their job that touches the
//! table model: turning cell text into a [`Value`], de-duplicating header names, and assembling
//! columns without breaking the equal-length invariant mid-way.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::{Column, FrameError, Table, Value};

/// Infers a typed value from one decoded cell.
///
/// Blank cells are missing. Otherwise tries integer, then float, then boolean (`true`/`false`,
/// any case); anything else stays text. All-digit cells of 16 or more characters stay text so
/// long identifiers keep every digit. The original (untrimmed) text is kept for text cells.
pub fn infer_value(cell: &str) -> Value {
    let x = cell.trim();
    if x.is_empty() {
        return Value::Missing;
    }
    let long_digits = x.len() >= 16 && x.bytes().all(|b| b.is_ascii_digit());
    if !long_digits {
        if let Ok(i) = x.parse::<i64>() {
            return Value::from(i);
        }
        if let Ok(f) = x.parse::<f64>() {
            return Value::Number(f);
        }
    }
    if x.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if x.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::from(cell)
}

/// Renames repeated header names by appending `suffix` once per earlier occurrence.
///
/// `["a", "a", "a"]` with suffix `"_"` becomes `["a", "a_", "a__"]`.
pub fn unique_names<S: AsRef<str>>(names: &[S], suffix: &str) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let k = seen.entry(name).or_insert(0);
            let out = alloc::format!("{name}{}", suffix.repeat(*k));
            *k += 1;
            out
        })
        .collect()
}

/// Assembles a table column by column.
///
/// Unlike [`Table::set`], columns may be supplied with any length; lengths are validated once in
/// [`TableBuilder::finish`], so a reader can fill columns in whatever order it decodes them.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl TableBuilder {
    /// Starts a table with the given (unique) column names and empty columns.
    pub fn new<I, S>(names: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for (j, name) in names.iter().enumerate() {
            if names[..j].contains(name) {
                return Err(FrameError::DuplicateColumn(name.clone()));
            }
        }
        let columns = names.iter().map(|_| Column::new()).collect();
        Ok(Self { names, columns })
    }

    /// Stores the values of column `name`, in row order.
    pub fn set_column(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<&mut Self, FrameError> {
        let Some(j) = self.names.iter().position(|n| n == name) else {
            return Err(FrameError::ColumnNotFound(name.to_string()));
        };
        self.columns[j] = values.into_iter().collect();
        Ok(self)
    }

    /// Appends one decoded record; cells past the record's end become missing.
    pub fn push_record(
        &mut self,
        cells: impl IntoIterator<Item = Value>,
    ) -> Result<&mut Self, FrameError> {
        let cells: Vec<Value> = cells.into_iter().collect();
        let width = self.names.len();
        if cells.len() > width {
            return Err(FrameError::LengthMismatch {
                column: String::from("<record>"),
                expected: width,
                actual: cells.len(),
            });
        }
        let mut cells = cells.into_iter();
        for c in &mut self.columns {
            c.push(cells.next().unwrap_or_default());
        }
        Ok(self)
    }

    /// Validates column lengths and produces the table.
    pub fn finish(self) -> Result<Table, FrameError> {
        let table = Table::from_columns(self.names.into_iter().zip(self.columns))?;
        tracing::debug!(rows = table.len(), columns = table.width(), "ingested");
        Ok(table)
    }
}

/// Builds a table from decoded records, inferring each cell's type with [`infer_value`].
///
/// Short records are padded with missing values; records wider than `names` are rejected.
pub fn table_from_records<N, R, C>(names: &[N], records: R) -> Result<Table, FrameError>
where
    N: AsRef<str>,
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: AsRef<str>,
{
    let mut b = TableBuilder::new(names.iter().map(|n| n.as_ref().to_string()))?;
    for record in records {
        b.push_record(record.into_iter().map(|cell| infer_value(cell.as_ref())))?;
    }
    b.finish()
}
