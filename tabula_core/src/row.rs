// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Borrowed row views and the row cursor.
//!
//! A [`RowView`] is a `(table, position)` pair. It borrows the table, so the borrow checker
//! already rules out holding one across a structural edit (`del`, `rename`, `set`, ...), all of
//! which take `&mut Table`. Column storage shared with *another* table can still be written
//! through that table; a view reads whatever the storage holds at the time of the read.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use hashbrown::HashMap;

use crate::{Table, Value};

/// Anything that can supply a value by column name.
///
/// [`Table::append`] pulls one value per table column from each record; names the record does
/// not know yield [`Value::Missing`].
pub trait Record {
    /// Returns the value stored under `name`, or missing.
    fn value(&self, name: &str) -> Value;
}

/// A read lens over one row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    row: usize,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(table: &'a Table, row: usize) -> Self {
        Self { table, row }
    }

    /// Row position inside the table.
    pub fn index(&self) -> usize {
        self.row
    }

    /// The table this view reads from.
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Returns the value in column `name`, or missing if there is no such column.
    pub fn get(&self, name: &str) -> Value {
        self.table
            .column_index(name)
            .and_then(|j| self.table.columns()[j].get(self.row))
            .unwrap_or_default()
    }

    /// Returns the value in column `name` coerced to a number (`NaN` when absent).
    pub fn number(&self, name: &str) -> f64 {
        self.get(name).to_number()
    }

    /// Returns the value in column `name` coerced to text (empty when absent).
    pub fn text(&self, name: &str) -> String {
        self.get(name).to_text()
    }

    /// Returns the value in column `name` coerced to a boolean (`false` when absent).
    pub fn bool(&self, name: &str) -> bool {
        self.get(name).to_bool()
    }

    /// Returns every value of the row, in column order.
    pub fn values(&self) -> Vec<Value> {
        self.table
            .columns()
            .iter()
            .map(|c| c.get(self.row).unwrap_or_default())
            .collect()
    }
}

impl Record for RowView<'_> {
    fn value(&self, name: &str) -> Value {
        self.get(name)
    }
}

impl Record for HashMap<String, Value> {
    fn value(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl Record for BTreeMap<String, Value> {
    fn value(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn value(&self, name: &str) -> Value {
        (**self).value(name)
    }
}

/// A restartable cursor over the rows of a [`Table`].
///
/// The cursor starts *before* the first row: [`RowCursor::current`] returns `None` until the
/// first successful [`RowCursor::advance`]. Once `advance` returns `false` it keeps returning
/// `false`. Cursors hold no shared state, so any number can walk the same table at once.
///
/// `RowCursor` is also a (fused) [`Iterator`] over [`RowView`]s.
#[derive(Debug, Clone)]
pub struct RowCursor<'a> {
    table: &'a Table,
    // `None` is "before first"; `Some(len)` is "past the end".
    pos: Option<usize>,
}

impl<'a> RowCursor<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self { table, pos: None }
    }

    /// Moves to the next row, returning `false` once the rows are exhausted.
    pub fn advance(&mut self) -> bool {
        let len = self.table.len();
        let next = match self.pos {
            None => 0,
            Some(p) => (p + 1).min(len),
        };
        self.pos = Some(next);
        next < len
    }

    /// The row the cursor is on, if any.
    pub fn current(&self) -> Option<RowView<'a>> {
        match self.pos {
            Some(p) if p < self.table.len() => Some(RowView::new(self.table, p)),
            _ => None,
        }
    }

    /// Rewinds to "before first".
    pub fn reset(&mut self) {
        self.pos = None;
    }

    fn remaining(&self) -> usize {
        let len = self.table.len();
        match self.pos {
            None => len,
            Some(p) => len.saturating_sub(p + 1),
        }
    }
}

impl<'a> Iterator for RowCursor<'a> {
    type Item = RowView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.advance() {
            return None;
        }
        self.current()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for RowCursor<'_> {}

impl FusedIterator for RowCursor<'_> {}
