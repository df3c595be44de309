// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hash equi-join with left-outer semantics.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use tabula_core::{Column, ColumnRef, RowKey, Table};

use crate::OpsError;

/// A join descriptor: `left` is looked up in a hash index built over `right`.
///
/// The result has one row per left row, in left order:
/// - the left columns, unchanged (their storage is shared with `left`), then
/// - every right column that is not a right key column, renamed to `prefix + name`.
///
/// Left rows without a match get missing values in the right-hand columns. If several right
/// rows share a key, only the last one is indexed (last write wins). A key with a missing part
/// never matches.
#[derive(Debug, Clone)]
pub struct Join<'a> {
    left: &'a Table,
    right: &'a Table,
    left_keys: Vec<String>,
    right_keys: Vec<String>,
}

impl<'a> Join<'a> {
    /// Joins `left` and `right` on the named columns, which must exist on both sides.
    pub fn new(left: &'a Table, right: &'a Table, keys: &[&str]) -> Self {
        Self {
            left,
            right,
            left_keys: to_strings(keys),
            right_keys: to_strings(keys),
        }
    }

    /// Sets the same key columns for both sides.
    pub fn keys(mut self, keys: &[&str]) -> Self {
        self.left_keys = to_strings(keys);
        self.right_keys = to_strings(keys);
        self
    }

    /// Sets the left key columns.
    pub fn left_keys(mut self, keys: &[&str]) -> Self {
        self.left_keys = to_strings(keys);
        self
    }

    /// Sets the right key columns.
    pub fn right_keys(mut self, keys: &[&str]) -> Self {
        self.right_keys = to_strings(keys);
        self
    }

    /// Builds the right-hand index: composite key to the last right row holding it.
    pub fn index(&self) -> Result<HashMap<RowKey, usize>, OpsError> {
        let cols = key_columns(self.right, &self.right_keys)?;
        let mut idx = HashMap::with_capacity(self.right.len());
        for r in self.right.iter() {
            let key = RowKey::from_columns(&cols, r.index());
            if !key.has_missing() {
                idx.insert(key, r.index());
            }
        }
        Ok(idx)
    }

    /// Runs the join, prefixing right-hand output columns with `prefix`.
    pub fn run(&self, prefix: &str) -> Result<Table, OpsError> {
        let (l, r) = (self.left_keys.len(), self.right_keys.len());
        if l != r {
            tracing::warn!(left = l, right = r, "join key count mismatch");
            return Err(OpsError::KeyCountMismatch { left: l, right: r });
        }
        if l == 0 {
            tracing::warn!("join without key columns");
            return Err(OpsError::EmptyKeys);
        }
        let left_cols = key_columns(self.left, &self.left_keys)?;
        let idx = self.index()?;

        let matches: Vec<Option<usize>> = self
            .left
            .iter()
            .map(|r| {
                let key = RowKey::from_columns(&left_cols, r.index());
                if key.has_missing() {
                    None
                } else {
                    idx.get(&key).copied()
                }
            })
            .collect();

        let mut out = self.left.copy(false);
        for (name, col) in self.right.keys().iter().zip(self.right.columns()) {
            if self.right_keys.contains(name) {
                continue;
            }
            let src = col.borrow();
            let gathered: Column = matches
                .iter()
                .map(|m| m.and_then(|i| src.get(i).cloned()).unwrap_or_default())
                .collect();
            out.add(alloc::format!("{prefix}{name}"), gathered)?;
        }
        tracing::debug!(
            left = self.left.len(),
            right = self.right.len(),
            matched = matches.iter().filter(|m| m.is_some()).count(),
            "joined tables"
        );
        Ok(out)
    }
}

fn to_strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| String::from(*k)).collect()
}

fn key_columns(table: &Table, keys: &[String]) -> Result<Vec<ColumnRef>, OpsError> {
    Ok(keys
        .iter()
        .map(|k| table.get(k))
        .collect::<Result<_, _>>()?)
}
