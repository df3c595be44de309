// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Example binary for `tabula_core` and `tabula_ops`.
//!
//! Set `RUST_LOG=debug` to see the per-operator diagnostics.

use tabula_core::ingest::{table_from_records, unique_names};
use tabula_core::{AggregateOp, SortOrder, Table};
use tabula_ops::{OpsError, TableOps};
use tracing_subscriber::EnvFilter;

const SALES: &[&[&str]] = &[
    &["1", "north", "widget", "12.5", "true"],
    &["2", "south", "widget", "7", "false"],
    &["3", "north", "gadget", "30", "true"],
    &["4", "east", "gadget", "", "true"],
    &["5", "south", "gizmo", "4.25"],
];

const REGIONS: &[&[&str]] = &[&["north", "Alice"], &["south", "Bob"], &["west", "Carol"]];

fn main() -> Result<(), OpsError> {
    init_tracing();

    let header = unique_names(&["id", "region", "product", "amount", "amount"], "_");
    let sales = table_from_records(&header, SALES.iter().map(|r| r.iter()))?;
    println!("sales ({} rows):\n{sales}", sales.len());

    let regions = table_from_records(&["region", "manager"], REGIONS.iter().map(|r| r.iter()))?;

    let mut priced = sales.drop_missing(&["amount"])?;
    priced.sort_by_keys(&[("amount", SortOrder::Desc)])?;
    println!("priced, by amount desc:\n{priced}");

    let big = sales.filter(|r| r.number("amount") >= 10.0);
    println!("amount >= 10:\n{big}");

    let mut totals = sales
        .group_by(&["region"])
        .apply("amount", "total", AggregateOp::Sum)
        .apply("amount", "max", AggregateOp::Max)
        .apply("id", "orders", AggregateOp::Count)
        .run()?;
    totals.sort_by(|a, b| a.text("region") < b.text("region"));
    println!("totals per region (note: `east` has a missing amount):\n{totals}");

    let joined = sales.join(&regions, &["region"]).run("r_")?;
    describe(&joined);
    println!("sales joined with regions:\n{joined}");

    let mut both = sales.slice(0, 2)?;
    both.concat(&sales.slice(-1, 5)?)?;
    both.append([sales.row(2)?]);
    println!("first two, last one, then row 2 again:\n{both}");

    let mut flagged = sales.pick(&["id", "amount_"])?;
    flagged.rename("amount_", "flag")?;
    flagged.fill_missing(false, &["flag"])?;
    println!("flags:\n{flagged}");

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

fn describe(t: &Table) {
    tracing::info!(rows = t.len(), columns = t.width(), keys = ?t.keys(), "table");
}
