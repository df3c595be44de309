// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Columns and shared column handles.

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};

use crate::Value;

/// An ordered sequence of values, one per row.
///
/// A column may mix value types. Its length is the only attribute a [`Table`](crate::Table)
/// cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    values: Vec<Value>,
}

impl Column {
    /// Creates an empty column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty column with room for `n` values.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            values: Vec::with_capacity(n),
        }
    }

    /// Creates a column of `n` missing values.
    pub fn missing(n: usize) -> Self {
        Self {
            values: alloc::vec![Value::Missing; n],
        }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at `row`.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Replaces the value at `row`, returning `false` if `row` is out of range.
    pub fn set(&mut self, row: usize, value: impl Into<Value>) -> bool {
        match self.values.get_mut(row) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Appends a value.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Borrows the values as a slice.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterates over the values in row order.
    pub fn iter(&self) -> core::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Returns a column of every value coerced to a number.
    pub fn to_numbers(&self) -> Self {
        self.values
            .iter()
            .map(|v| Value::Number(v.to_number()))
            .collect()
    }

    /// Returns a column of every value coerced to text.
    ///
    /// Missing values become empty text.
    pub fn to_texts(&self) -> Self {
        self.values
            .iter()
            .map(|v| Value::text(v.to_text()))
            .collect()
    }

    /// Returns the values for which `f` returns `true`, in their original order.
    pub fn filter(&self, mut f: impl FnMut(&Value) -> bool) -> Self {
        self.values.iter().filter(|v| f(v)).cloned().collect()
    }

    /// Replaces every missing value with `value`, in place.
    pub fn fill_missing(&mut self, value: &Value) -> &mut Self {
        for v in &mut self.values {
            if v.is_missing() {
                *v = value.clone();
            }
        }
        self
    }

    /// Gathers the values at `rows` into a new column.
    ///
    /// Positions past the end yield missing values.
    pub fn take(&self, rows: &[usize]) -> Self {
        rows.iter()
            .map(|&i| self.values.get(i).cloned().unwrap_or_default())
            .collect()
    }

    pub(crate) fn extend_from(&mut self, values: &[Value]) {
        self.values.extend_from_slice(values);
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }
}

impl From<Vec<Value>> for Column {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl<V: Into<Value>> FromIterator<V> for Column {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Column {
    type Item = &'a Value;
    type IntoIter = core::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// A shared handle to column storage.
///
/// Cloning a `ColumnRef` aliases the same storage: a write through one handle is visible through
/// every other handle, including handles held by other tables (after a shallow
/// [`Table::copy`](crate::Table::copy) or [`Table::pick`](crate::Table::pick)).
///
/// Borrow guards returned by [`ColumnRef::borrow`] and [`ColumnRef::borrow_mut`] must be dropped
/// before calling back into a table operation that touches the same column.
#[derive(Debug, Clone, Default)]
pub struct ColumnRef(Rc<RefCell<Column>>);

impl ColumnRef {
    /// Wraps a column in a new, unshared handle.
    pub fn new(column: Column) -> Self {
        Self(Rc::new(RefCell::new(column)))
    }

    /// Immutably borrows the column.
    pub fn borrow(&self) -> Ref<'_, Column> {
        self.0.borrow()
    }

    /// Mutably borrows the column. Writes are visible through every alias.
    pub fn borrow_mut(&self) -> RefMut<'_, Column> {
        self.0.borrow_mut()
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the value at `row`.
    pub fn get(&self, row: usize) -> Option<Value> {
        self.0.borrow().get(row).cloned()
    }

    /// Returns `true` if both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns an independent copy of the column.
    pub fn to_column(&self) -> Column {
        self.0.borrow().clone()
    }

    /// Returns a new, unshared handle holding a copy of the column.
    pub fn deep_clone(&self) -> Self {
        Self::new(self.to_column())
    }
}

impl From<Column> for ColumnRef {
    fn from(column: Column) -> Self {
        Self::new(column)
    }
}

impl From<Vec<Value>> for ColumnRef {
    fn from(values: Vec<Value>) -> Self {
        Self::new(Column::from(values))
    }
}

/// Collects the distinct storages among `columns`, preserving first-seen order.
///
/// Operations that mutate storage in place must touch each storage once, even when a table holds
/// the same handle under two names.
pub(crate) fn distinct_storages<'a>(
    columns: impl IntoIterator<Item = &'a ColumnRef>,
) -> Vec<&'a ColumnRef> {
    let mut out: Vec<&ColumnRef> = Vec::new();
    for c in columns {
        if !out.iter().any(|seen| seen.ptr_eq(c)) {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn filter_preserves_order() {
        let c: Column = [1.0, 5.0, 2.0, 7.0].into_iter().collect();
        let big = c.filter(|v| v.to_number() > 1.5);
        assert_eq!(big, Column::from_iter([5.0, 2.0, 7.0]));
    }

    #[test]
    fn fill_missing_replaces_absent_and_nan() {
        let mut c = Column::from_iter([None, Some(1.0), Some(f64::NAN)]);
        c.fill_missing(&Value::from(0.0));
        assert_eq!(c, Column::from_iter([0.0, 1.0, 0.0]));
    }

    #[test]
    fn coerce_all_columns() {
        let c = Column::from(vec![Value::from("2"), Value::Missing, Value::from(3.5)]);
        let n = c.to_numbers();
        assert_eq!(n.get(0), Some(&Value::from(2.0)));
        assert!(n.get(1).unwrap().is_missing());
        let t = c.to_texts();
        assert_eq!(t, Column::from_iter(["2", "", "3.5"]));
    }

    #[test]
    fn take_gathers_rows_and_pads_out_of_range() {
        let c: Column = ["a", "b", "c"].into_iter().collect();
        let t = c.take(&[2, 0, 9]);
        assert_eq!(t, Column::from_iter([Some("c"), Some("a"), None]));
    }

    #[test]
    fn shared_handles_observe_writes() {
        let a = ColumnRef::new(Column::from_iter([1.0, 2.0]));
        let b = a.clone();
        b.borrow_mut().set(0, 10.0);
        assert_eq!(a.get(0), Some(Value::from(10.0)));
        assert!(a.ptr_eq(&b));

        let c = a.deep_clone();
        c.borrow_mut().set(1, 20.0);
        assert_eq!(a.get(1), Some(Value::from(2.0)));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn distinct_storages_skips_aliases() {
        let a = ColumnRef::new(Column::from_iter([1.0]));
        let b = ColumnRef::new(Column::from_iter([2.0]));
        let cols = [a.clone(), b.clone(), a.clone()];
        assert_eq!(distinct_storages(&cols).len(), 2);
    }
}
