// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The table: named, equal-length columns.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::column::distinct_storages;
use crate::{Column, ColumnRef, FrameError, Record, RowCursor, RowView, Value};

/// A named, ordered collection of equal-length columns.
///
/// Invariants:
/// - every column has the same length; the row count is derived from it,
/// - column names are unique; insertion order is the display and iteration order.
///
/// Every mutating operation either succeeds completely or returns an error and leaves the table
/// untouched.
///
/// Cloning a table is a *shallow* copy (see [`Table::copy`]).
#[derive(Debug, Clone, Default)]
pub struct Table {
    index: HashMap<String, usize>,
    names: Vec<String>,
    columns: Vec<ColumnRef>,
}

impl Table {
    /// Creates a table with the given column names and zero rows.
    pub fn new<I, S>(names: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut t = Self::default();
        for name in names {
            t.add(name, Column::new())?;
        }
        Ok(t)
    }

    /// Builds a table from `(name, column)` pairs, validating names and lengths.
    pub fn from_columns<I, S, C>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<ColumnRef>,
    {
        let mut t = Self::default();
        for (name, column) in columns {
            t.add(name, column)?;
        }
        Ok(t)
    }

    /// Returns a table with the same column names and zero rows.
    pub fn empty_like(&self) -> Self {
        Self {
            index: self.index.clone(),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|_| ColumnRef::new(Column::new()))
                .collect(),
        }
    }

    /// Copies the table.
    ///
    /// A shallow copy shares column storage with `self`: writes through
    /// [`ColumnRef::borrow_mut`] are visible in both tables. A deep copy owns independent storage.
    /// Structural edits (`add`, `del`, `rename`, ...) never affect the other table either way.
    pub fn copy(&self, deep: bool) -> Self {
        let mut b = self.clone();
        if deep {
            b.columns = self.columns.iter().map(ColumnRef::deep_clone).collect();
        }
        b
    }

    /// Column names, in order.
    pub fn keys(&self) -> &[String] {
        &self.names
    }

    /// Column handles, in the same order as [`Table::keys`].
    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, ColumnRef::len)
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of column `name`, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns `true` if every name in `names` is a column.
    pub fn has(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.index.contains_key(*n))
    }

    /// Fails with [`FrameError::ColumnNotFound`] on the first name that is not a column.
    pub fn check(&self, names: &[&str]) -> Result<(), FrameError> {
        match names.iter().find(|n| !self.index.contains_key(**n)) {
            Some(n) => Err(not_found(n)),
            None => Ok(()),
        }
    }

    /// Returns a shared handle to column `name`.
    pub fn get(&self, name: &str) -> Result<ColumnRef, FrameError> {
        self.column_index(name)
            .map(|j| self.columns[j].clone())
            .ok_or_else(|| not_found(name))
    }

    /// Replaces column `name`, or appends it if absent.
    ///
    /// The column must match the length of the table's other columns; a table with no other
    /// columns accepts any length.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        column: impl Into<ColumnRef>,
    ) -> Result<&mut Self, FrameError> {
        let name = name.into();
        let column = column.into();
        let existing = self.column_index(&name);
        self.check_length(&name, &column, existing)?;
        match existing {
            Some(j) => self.columns[j] = column,
            None => self.push_column(name, column),
        }
        Ok(self)
    }

    /// Appends column `name`.
    ///
    /// Fails with [`FrameError::DuplicateColumn`] if the name is taken; names are never
    /// auto-suffixed.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        column: impl Into<ColumnRef>,
    ) -> Result<&mut Self, FrameError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(duplicate(name));
        }
        let column = column.into();
        self.check_length(&name, &column, None)?;
        self.push_column(name, column);
        Ok(self)
    }

    /// Removes the named columns. Unknown names are ignored.
    ///
    /// The remaining columns keep their relative order.
    pub fn del(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            if let Some(j) = self.index.remove(*name) {
                self.names.remove(j);
                self.columns.remove(j);
                for k in self.index.values_mut() {
                    if *k > j {
                        *k -= 1;
                    }
                }
            }
        }
        self
    }

    /// Renames column `old` to `new`, keeping its position.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> Result<&mut Self, FrameError> {
        let new = new.into();
        let Some(j) = self.column_index(old) else {
            return Err(not_found(old));
        };
        if old == new {
            return Ok(self);
        }
        if self.index.contains_key(&new) {
            return Err(duplicate(new));
        }
        self.index.remove(old);
        self.index.insert(new.clone(), j);
        self.names[j] = new;
        Ok(self)
    }

    /// Returns a new table holding the named columns, sharing their storage.
    ///
    /// Repeating a name is harmless; the column appears once.
    pub fn pick(&self, names: &[&str]) -> Result<Self, FrameError> {
        self.check(names)?;
        let mut b = Self::default();
        for name in names {
            if !b.index.contains_key(*name) {
                b.push_column((*name).to_string(), self.get(name)?);
            }
        }
        Ok(b)
    }

    /// Returns rows `[i, j)` as a new table with its own storage.
    ///
    /// Negative positions count from the end (`-1` is the last row).
    pub fn slice(&self, i: isize, j: isize) -> Result<Self, FrameError> {
        let (start, end) = self.normalize_range(i, j)?;
        let mut b = self.clone();
        b.columns = self
            .columns
            .iter()
            .map(|c| ColumnRef::from(c.borrow().values()[start..end].to_vec()))
            .collect();
        Ok(b)
    }

    /// Appends the rows of `other` to `self`, matching columns by name.
    ///
    /// Every column of `self` must exist in `other`. Columns of `other` that `self` does not have
    /// are ignored and their data is dropped.
    pub fn concat(&mut self, other: &Self) -> Result<&mut Self, FrameError> {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        other.check(&names)?;
        // Snapshot first: `other` may share storage with `self`.
        let storages = distinct_storages(&self.columns);
        let tails: Vec<Column> = storages
            .iter()
            .map(|s| {
                let j = self.position_of(s);
                other.columns[other.index[&self.names[j]]].to_column()
            })
            .collect();
        for (s, tail) in storages.iter().zip(&tails) {
            s.borrow_mut().extend_from(tail.values());
        }
        tracing::debug!(
            appended = other.len(),
            rows = self.len(),
            "concatenated tables"
        );
        Ok(self)
    }

    /// Appends one row per record, pulling each column's value by name.
    ///
    /// Names a record does not know become missing values.
    pub fn append<R: Record>(&mut self, records: impl IntoIterator<Item = R>) -> &mut Self {
        let storages = distinct_storages(&self.columns);
        let names: Vec<&str> = storages
            .iter()
            .map(|s| self.names[self.position_of(s)].as_str())
            .collect();
        let mut tails: Vec<Vec<Value>> = alloc::vec![Vec::new(); storages.len()];
        let mut added = 0_usize;
        for record in records {
            for (tail, name) in tails.iter_mut().zip(&names) {
                tail.push(record.value(name));
            }
            added += 1;
        }
        for (s, tail) in storages.iter().zip(tails) {
            s.borrow_mut().values_mut().extend(tail);
        }
        tracing::debug!(added, rows = self.len(), "appended records");
        self
    }

    /// Returns a cursor over the rows.
    pub fn iter(&self) -> RowCursor<'_> {
        RowCursor::new(self)
    }

    /// Returns a view of row `row`.
    pub fn row(&self, row: usize) -> Result<RowView<'_>, FrameError> {
        let len = self.len();
        if row >= len {
            return Err(FrameError::RowOutOfRange { row, len });
        }
        Ok(RowView::new(self, row))
    }

    /// Returns a new table with the rows for which `f` returns `true`, in their original order.
    pub fn filter(&self, mut f: impl FnMut(&RowView<'_>) -> bool) -> Self {
        let rows: Vec<usize> = self.iter().filter(|r| f(r)).map(|r| r.index()).collect();
        tracing::debug!(rows = self.len(), kept = rows.len(), "filtered table");
        self.take(&rows)
    }

    /// Gathers the given row positions into a new table with its own storage.
    pub fn take(&self, rows: &[usize]) -> Self {
        let mut b = self.clone();
        b.columns = self
            .columns
            .iter()
            .map(|c| ColumnRef::new(c.borrow().take(rows)))
            .collect();
        b
    }

    /// Evaluates `f` on every row, collecting the results into a column.
    pub fn map(&self, mut f: impl FnMut(&RowView<'_>) -> Value) -> Column {
        let mut out = Column::with_capacity(self.len());
        for r in self.iter() {
            out.push(f(&r));
        }
        out
    }

    /// Evaluates `f` on every row and stores the results as column `name` (replacing it if
    /// present).
    pub fn map_to(
        &mut self,
        name: impl Into<String>,
        f: impl FnMut(&RowView<'_>) -> Value,
    ) -> Result<&mut Self, FrameError> {
        let column = self.map(f);
        self.set(name, column)
    }

    /// Returns the rows with no missing value in the named columns (all columns when `names` is
    /// empty).
    pub fn drop_missing(&self, names: &[&str]) -> Result<Self, FrameError> {
        self.check(names)?;
        let cols: Vec<ColumnRef> = if names.is_empty() {
            self.columns.clone()
        } else {
            names.iter().map(|n| self.get(n)).collect::<Result<_, _>>()?
        };
        Ok(self.filter(|r| cols.iter().all(|c| present(c, r.index()))))
    }

    /// Replaces missing values with `value` in the named columns (all columns when `names` is
    /// empty), in place.
    pub fn fill_missing(
        &mut self,
        value: impl Into<Value>,
        names: &[&str],
    ) -> Result<&mut Self, FrameError> {
        self.check(names)?;
        let value = value.into();
        let targets: Vec<ColumnRef> = if names.is_empty() {
            self.columns.clone()
        } else {
            names.iter().map(|n| self.get(n)).collect::<Result<_, _>>()?
        };
        for c in distinct_storages(&targets) {
            c.borrow_mut().fill_missing(&value);
        }
        Ok(self)
    }

    /// Writes a header line and one line per row, fields joined by `sep`.
    ///
    /// Missing values render as empty fields. No quoting is applied.
    pub fn write_delimited(&self, out: &mut impl fmt::Write, sep: &str) -> fmt::Result {
        if self.columns.is_empty() {
            return Ok(());
        }
        for (j, name) in self.names.iter().enumerate() {
            if j > 0 {
                out.write_str(sep)?;
            }
            out.write_str(name)?;
        }
        out.write_char('\n')?;
        let guards: Vec<_> = self.columns.iter().map(ColumnRef::borrow).collect();
        for i in 0..self.len() {
            for (j, c) in guards.iter().enumerate() {
                if j > 0 {
                    out.write_str(sep)?;
                }
                if let Some(v) = c.get(i) {
                    write!(out, "{v}")?;
                }
            }
            out.write_char('\n')?;
        }
        Ok(())
    }

    fn push_column(&mut self, name: String, column: ColumnRef) {
        self.index.insert(name.clone(), self.columns.len());
        self.names.push(name);
        self.columns.push(column);
    }

    fn position_of(&self, storage: &ColumnRef) -> usize {
        self.columns
            .iter()
            .position(|c| c.ptr_eq(storage))
            .unwrap_or_default()
    }

    fn check_length(
        &self,
        name: &str,
        column: &ColumnRef,
        replacing: Option<usize>,
    ) -> Result<(), FrameError> {
        let other = self
            .columns
            .iter()
            .enumerate()
            .find(|(j, _)| Some(*j) != replacing);
        if let Some((_, c)) = other {
            let (expected, actual) = (c.len(), column.len());
            if expected != actual {
                tracing::warn!(column = name, expected, actual, "column length mismatch");
                return Err(FrameError::LengthMismatch {
                    column: name.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn normalize_range(&self, i: isize, j: isize) -> Result<(usize, usize), FrameError> {
        let len = self.len();
        let n = isize::try_from(len).unwrap_or(isize::MAX);
        let start = if i < 0 { i + n } else { i };
        let end = if j < 0 { j + n } else { j };
        if start < 0 || end < start || end > n {
            return Err(FrameError::SliceOutOfRange { start, end, len });
        }
        Ok((start.unsigned_abs(), end.unsigned_abs()))
    }
}

/// Tab-separated rendering for debugging: a header line, then one line per row.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_delimited(f, "\t")
    }
}

fn present(column: &ColumnRef, row: usize) -> bool {
    column.get(row).is_some_and(|v| !v.is_missing())
}

fn not_found(name: &str) -> FrameError {
    tracing::warn!(column = name, "column not found");
    FrameError::ColumnNotFound(name.to_string())
}

fn duplicate(name: String) -> FrameError {
    tracing::warn!(column = name.as_str(), "column already exists");
    FrameError::DuplicateColumn(name)
}
