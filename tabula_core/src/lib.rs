// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory columnar tables of dynamically typed values.
//!
//! This crate provides:
//! - [`Value`], a closed scalar type with number/text/boolean coercions and a missing marker,
//! - [`Column`] with element-wise transforms and aggregates, and [`ColumnRef`] for explicit
//!   sharing of column storage between tables,
//! - [`Table`], the named equal-length column collection, with structural edits, filtering,
//!   sorting and a tab-separated debug rendering,
//! - [`RowView`] / [`RowCursor`], the borrowed row lens every operator reads through,
//! - [`RowKey`], the composite key used for grouping and joining (see `tabula_ops`).
//!
//! Everything is single-threaded and synchronous. Tables are `!Send`; sharing one across
//! threads requires external synchronisation and is not supported.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod aggregate;
mod column;
mod error;
#[cfg(not(feature = "std"))]
mod float;
pub mod ingest;
mod key;
mod row;
mod sort;
mod table;
mod value;

pub use aggregate::AggregateOp;
pub use column::{Column, ColumnRef};
pub use error::FrameError;
pub use key::{KeyPart, RowKey};
pub use row::{Record, RowCursor, RowView};
pub use sort::{SortOrder, compare_values};
pub use table::Table;
pub use value::Value;
