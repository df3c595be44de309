// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relational operators over `tabula_core` tables.
//!
//! This crate provides:
//! - [`GroupBy`], which partitions rows by a composite key and aggregates each partition, and
//! - [`Join`], a hash equi-join with left-outer semantics.
//!
//! Both are short-lived descriptors: they borrow their input tables, own no column data, and
//! produce a fresh [`Table`] when run. [`TableOps`] adds builder entry points on `Table`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod group;
mod join;

pub use error::OpsError;
pub use group::{GroupBy, Reducer};
pub use join::Join;

use tabula_core::Table;

/// Entry points for the grouping and join engines.
pub trait TableOps {
    /// Starts a group-by on the named key columns.
    fn group_by<'a>(&'a self, keys: &[&str]) -> GroupBy<'a>;

    /// Starts a left-outer equi-join against `right` on the named key columns.
    fn join<'a>(&'a self, right: &'a Table, keys: &[&str]) -> Join<'a>;
}

impl TableOps for Table {
    fn group_by<'a>(&'a self, keys: &[&str]) -> GroupBy<'a> {
        GroupBy::new(self, keys)
    }

    fn join<'a>(&'a self, right: &'a Table, keys: &[&str]) -> Join<'a> {
        Join::new(self, right, keys)
    }
}
