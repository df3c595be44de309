// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place row reordering.
//!
//! Sorting never swaps cells column by column. It computes one permutation of row positions with
//! a stable bottom-up merge sort, then rewrites every distinct column storage once.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::column::distinct_storages;
use crate::{FrameError, RowView, Table, Value};

/// Sorting order for [`Table::sort_by_keys`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl Table {
    /// Reorders the rows in place, ascending by `less`. Every column moves together.
    ///
    /// The sort is stable: rows that compare equal keep their relative order, so re-sorting with
    /// the same comparator leaves the table unchanged.
    ///
    /// `less` should be a strict weak ordering. A comparator that is not (for example `<` on
    /// numbers where missing values read as `NaN`) never panics; the rows still form a
    /// permutation of the input, in an unspecified order.
    pub fn sort_by(
        &mut self,
        mut less: impl FnMut(&RowView<'_>, &RowView<'_>) -> bool,
    ) -> &mut Self {
        let perm = {
            let this: &Self = self;
            let mut perm: Vec<usize> = (0..this.len()).collect();
            let row_less = |a, b| less(&RowView::new(this, a), &RowView::new(this, b));
            merge_sort(&mut perm, row_less);
            perm
        };
        self.permute(&perm);
        tracing::debug!(rows = perm.len(), columns = self.width(), "sorted table");
        self
    }

    /// Sorts by a list of `(column, order)` keys, most significant first.
    ///
    /// Values order as numbers (booleans count as `0`/`1`) before text; missing values go last
    /// regardless of `order`.
    pub fn sort_by_keys(&mut self, keys: &[(&str, SortOrder)]) -> Result<&mut Self, FrameError> {
        let names: Vec<&str> = keys.iter().map(|(n, _)| *n).collect();
        self.check(&names)?;
        let cols: Vec<_> = names.iter().map(|n| self.get(n)).collect::<Result<_, _>>()?;
        Ok(self.sort_by(|a, b| {
            for (c, (_, order)) in cols.iter().zip(keys) {
                let c = c.borrow();
                let va = c.get(a.index()).cloned().unwrap_or_default();
                let vb = c.get(b.index()).cloned().unwrap_or_default();
                match compare_values(&va, &vb, *order) {
                    Ordering::Equal => continue,
                    o => return o == Ordering::Less,
                }
            }
            false
        }))
    }

    fn permute(&mut self, perm: &[usize]) {
        for s in distinct_storages(self.columns()) {
            let mut col = s.borrow_mut();
            let values = col.values_mut();
            let mut old: Vec<Option<Value>> =
                core::mem::take(values).into_iter().map(Some).collect();
            values.extend(perm.iter().map(|&i| old[i].take().unwrap_or_default()));
        }
    }
}

/// Stable bottom-up merge sort of row positions.
///
/// An element of the right run is taken only when `less(right, left)` holds, so equal rows keep
/// their order and any comparator, consistent or not, yields a permutation of `perm`.
fn merge_sort(perm: &mut Vec<usize>, mut less: impl FnMut(usize, usize) -> bool) {
    let n = perm.len();
    let mut buf = vec![0; n];
    let mut width = 1_usize;
    while width < n {
        let mut lo = 0;
        while lo < n {
            let mid = lo.saturating_add(width).min(n);
            let hi = mid.saturating_add(width).min(n);
            let (mut i, mut j) = (lo, mid);
            for slot in &mut buf[lo..hi] {
                if j < hi && (i == mid || less(perm[j], perm[i])) {
                    *slot = perm[j];
                    j += 1;
                } else {
                    *slot = perm[i];
                    i += 1;
                }
            }
            lo = hi;
        }
        core::mem::swap(perm, &mut buf);
        width = width.saturating_mul(2);
    }
}

/// Total order over values used by [`Table::sort_by_keys`].
///
/// Missing values compare greater than everything in both directions.
pub fn compare_values(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let o = match (a.as_text(), b.as_text()) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.to_number().total_cmp(&b.to_number()),
    };
    match order {
        SortOrder::Asc => o,
        SortOrder::Desc => o.reverse(),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::Column;

    fn sample() -> Table {
        Table::from_columns([
            ("k", Column::from_iter([3.0, 1.0, 2.0, 1.0])),
            ("tag", Column::from_iter(["c", "a1", "b", "a2"])),
        ])
        .unwrap()
    }

    fn rows(t: &Table) -> Vec<Vec<Value>> {
        t.iter().map(|r| r.values()).collect()
    }

    #[test]
    fn sort_moves_every_column_together_and_is_stable() {
        let mut t = sample();
        t.sort_by(|a, b| a.number("k") < b.number("k"));
        assert_eq!(
            t.iter().map(|r| r.text("tag")).collect::<Vec<_>>(),
            vec!["a1", "a2", "b", "c"]
        );
        assert_eq!(
            t.iter().map(|r| r.number("k")).collect::<Vec<_>>(),
            vec![1.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn sort_is_a_permutation_and_idempotent() {
        let mut t = sample();
        let mut before = rows(&t);
        t.sort_by(|a, b| a.text("tag") > b.text("tag"));
        let once = rows(&t);
        t.sort_by(|a, b| a.text("tag") > b.text("tag"));
        assert_eq!(rows(&t), once);

        let mut after = once;
        let key = |r: &Vec<Value>| r[1].to_text();
        before.sort_by_key(key);
        after.sort_by_key(key);
        assert_eq!(before, after);
    }

    #[test]
    fn aliased_columns_are_permuted_once() {
        let mut t = sample();
        let k = t.get("k").unwrap();
        t.add("k2", k).unwrap();
        t.sort_by(|a, b| a.number("k") < b.number("k"));
        assert_eq!(
            t.iter().map(|r| r.number("k2")).collect::<Vec<_>>(),
            vec![1.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn sort_by_keys_orders_missing_last() {
        let a = vec![
            Value::Missing,
            Value::from(2.0),
            Value::from("x"),
            Value::from(1.0),
        ];
        let mut t = Table::from_columns([
            ("a", Column::from(a)),
            ("b", Column::from_iter([0.0, 1.0, 2.0, 3.0])),
        ])
        .unwrap();
        t.sort_by_keys(&[("a", SortOrder::Asc)]).unwrap();
        assert_eq!(
            t.iter().map(|r| r.number("b")).collect::<Vec<_>>(),
            vec![3.0, 1.0, 2.0, 0.0]
        );
        t.sort_by_keys(&[("a", SortOrder::Desc)]).unwrap();
        assert_eq!(
            t.iter().map(|r| r.number("b")).collect::<Vec<_>>(),
            vec![2.0, 1.0, 3.0, 0.0]
        );
        assert!(t.sort_by_keys(&[("zzz", SortOrder::Asc)]).is_err());
    }

    #[test]
    fn sort_by_keys_uses_later_keys_to_break_ties() {
        let mut t = sample();
        t.sort_by_keys(&[("k", SortOrder::Asc), ("tag", SortOrder::Desc)])
            .unwrap();
        assert_eq!(
            t.iter().map(|r| r.text("tag")).collect::<Vec<_>>(),
            vec!["a2", "a1", "b", "c"]
        );
    }

    // xorshift64; deterministic so failures reproduce.
    fn noisy_column(n: usize, seed: u64) -> Column {
        let mut x = seed;
        (0..n)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                if x % 4 == 0 {
                    Value::Missing
                } else {
                    Value::from((x % 1000) as f64)
                }
            })
            .collect()
    }

    #[test]
    fn nan_comparator_never_panics_and_keeps_rows_whole() {
        for n in [5, 17, 33, 100, 257] {
            let x = noisy_column(n, 0x9e37_79b9_7f4a_7c15 ^ n as u64);
            let id: Column = (0..n).map(Value::from).collect();
            let mut t = Table::from_columns([("x", x.clone()), ("copy", x), ("id", id)]).unwrap();
            t.sort_by(|a, b| a.number("x") < b.number("x"));

            for r in t.iter() {
                assert_eq!(r.get("x").is_missing(), r.get("copy").is_missing());
                assert_eq!(r.get("x").to_text(), r.get("copy").to_text());
            }
            let mut ids: Vec<f64> = t.iter().map(|r| r.number("id")).collect();
            ids.sort_by(f64::total_cmp);
            let expected: Vec<f64> = (0..n).map(|i| Value::from(i).to_number()).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn merge_sort_handles_odd_run_lengths() {
        let data = [5, 3, 9, 1, 7, 3, 8, 2, 6, 4, 0];
        let mut perm: Vec<usize> = (0..data.len()).collect();
        merge_sort(&mut perm, |a, b| data[a] < data[b]);
        let sorted: Vec<i32> = perm.iter().map(|&i| data[i]).collect();
        assert_eq!(sorted, [0, 1, 2, 3, 3, 4, 5, 6, 7, 8, 9]);
        // Equal values keep input order.
        assert_eq!(perm[3..5], [1, 5]);
    }
}
