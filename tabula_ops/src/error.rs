// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by the grouping and join engines.

use tabula_core::FrameError;

/// Errors returned when running a [`GroupBy`](crate::GroupBy) or [`Join`](crate::Join).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpsError {
    /// No key columns were given.
    #[error("key list is empty")]
    EmptyKeys,
    /// Left and right key lists differ in length.
    #[error("number of left keys ({left}) does not match number of right keys ({right})")]
    KeyCountMismatch {
        /// Number of left key columns.
        left: usize,
        /// Number of right key columns.
        right: usize,
    },
    /// A referenced column is missing, or an output name collides.
    #[error(transparent)]
    Frame(#[from] FrameError),
}
