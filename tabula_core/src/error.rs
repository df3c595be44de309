// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by structural table operations.

extern crate alloc;

use alloc::string::String;

/// Errors returned when building, editing or reading a [`Table`](crate::Table).
///
/// Every variant is a caller contract violation: the operation that returned it left the table
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// A column referenced by name does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    /// A column name is already taken.
    #[error("column already exists: {0}")]
    DuplicateColumn(String),
    /// A column does not have the table's row count.
    #[error("invalid length for column {column}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Column being added, replaced or extended.
        column: String,
        /// Row count required by the table.
        expected: usize,
        /// Row count actually supplied.
        actual: usize,
    },
    /// A row range does not fit inside the table.
    #[error("slice [{start}, {end}) out of range for {len} rows")]
    SliceOutOfRange {
        /// Normalised start position.
        start: isize,
        /// Normalised end position.
        end: isize,
        /// Table row count.
        len: usize,
    },
    /// A row position is past the end of the table.
    #[error("row {row} out of range for {len} rows")]
    RowOutOfRange {
        /// Requested row position.
        row: usize,
        /// Table row count.
        len: usize,
    },
}
