// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-column aggregates.
//!
//! Missing-value policy:
//! - `sum`, `mean`, `var` and `std` are strict: any missing element makes the result `NaN`.
//! - `min` and `max` skip missing elements. An all-missing (or empty) column yields the
//!   infinite sentinel: `+Inf` for `min`, `-Inf` for `max`.
//! - `count` counts every position, missing or not.
//! - `first` and `last` return the element as-is, or missing for an empty column.

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::{Column, Value};

/// A named aggregate function over a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// First element.
    First,
    /// Last element.
    Last,
    /// Number of elements, including missing ones.
    Count,
    /// Sum (strict on missing).
    Sum,
    /// Arithmetic mean (strict on missing).
    Mean,
    /// Population variance (strict on missing).
    Var,
    /// Population standard deviation (strict on missing).
    Std,
    /// Minimum (skips missing).
    Min,
    /// Maximum (skips missing).
    Max,
}

impl AggregateOp {
    /// Applies the aggregate to `column`.
    pub fn apply(self, column: &Column) -> Value {
        match self {
            Self::First => column.first(),
            Self::Last => column.last(),
            Self::Count => column.count(),
            Self::Sum => column.sum(),
            Self::Mean => column.mean(),
            Self::Var => column.var(),
            Self::Std => column.std(),
            Self::Min => column.min(),
            Self::Max => column.max(),
        }
    }

    /// Lower-case name, handy for building output column names.
    pub fn name(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Var => "var",
            Self::Std => "std",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl Column {
    /// First value, or missing when empty.
    pub fn first(&self) -> Value {
        self.values().first().cloned().unwrap_or_default()
    }

    /// Last value, or missing when empty.
    pub fn last(&self) -> Value {
        self.values().last().cloned().unwrap_or_default()
    }

    /// Number of positions, missing ones included.
    pub fn count(&self) -> Value {
        Value::from(self.len())
    }

    /// Sum of all values; `NaN` if any value is missing.
    pub fn sum(&self) -> Value {
        Value::Number(self.strict_sum())
    }

    /// Mean of all values; `NaN` if any value is missing or the column is empty.
    pub fn mean(&self) -> Value {
        Value::Number(self.strict_sum() / self.len_f64())
    }

    /// Population variance, computed as `E[x^2] - E[x]^2`; `NaN` if any value is missing.
    pub fn var(&self) -> Value {
        let n = self.len_f64();
        let (mut sq, mut s) = (0.0, 0.0);
        for v in self.iter() {
            if v.is_missing() {
                return Value::Number(f64::NAN);
            }
            let x = v.to_number();
            sq += x * x;
            s += x;
        }
        let mean = s / n;
        Value::Number(sq / n - mean * mean)
    }

    /// Population standard deviation, `sqrt(max(var, 0))`; `NaN` if any value is missing.
    pub fn std(&self) -> Value {
        let var = self.var().to_number();
        if var.is_nan() {
            return Value::Number(f64::NAN);
        }
        Value::Number(var.max(0.0).sqrt())
    }

    /// Minimum, skipping missing values; `+Inf` when nothing is left.
    pub fn min(&self) -> Value {
        let mut m = f64::INFINITY;
        for v in self.iter().filter(|v| !v.is_missing()) {
            let x = v.to_number();
            if x < m {
                m = x;
            }
        }
        Value::Number(m)
    }

    /// Maximum, skipping missing values; `-Inf` when nothing is left.
    pub fn max(&self) -> Value {
        let mut m = f64::NEG_INFINITY;
        for v in self.iter().filter(|v| !v.is_missing()) {
            let x = v.to_number();
            if x > m {
                m = x;
            }
        }
        Value::Number(m)
    }

    fn strict_sum(&self) -> f64 {
        let mut s = 0.0;
        for v in self.iter() {
            if v.is_missing() {
                return f64::NAN;
            }
            s += v.to_number();
        }
        s
    }

    fn len_f64(&self) -> f64 {
        #[allow(clippy::cast_precision_loss, reason = "row counts stay below 2^52")]
        let n = self.len() as f64;
        n
    }
}
