// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite row keys used to partition (group) and match (join) rows.

extern crate alloc;

use alloc::rc::Rc;

use smallvec::SmallVec;

use crate::{ColumnRef, Value};

/// One normalised component of a [`RowKey`].
///
/// Normalisation makes equal-looking values hash alike: `-0.0` folds into `0.0` and `NaN`
/// folds into `Missing`. Numbers and text never compare equal, so `3` and `"3"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// A missing value (including `NaN`).
    Missing,
    /// Bit pattern of a non-`NaN` number.
    Number(u64),
    /// A boolean.
    Bool(bool),
    /// A string.
    Text(Rc<str>),
}

impl From<&Value> for KeyPart {
    fn from(v: &Value) -> Self {
        match v {
            Value::Missing => Self::Missing,
            Value::Number(x) if x.is_nan() => Self::Missing,
            Value::Number(x) => {
                let x = if *x == 0.0 { 0.0 } else { *x };
                Self::Number(x.to_bits())
            }
            Value::Bool(b) => Self::Bool(*b),
            Value::Text(s) => Self::Text(Rc::clone(s)),
        }
    }
}

/// An ordered tuple of key parts with structural equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowKey(SmallVec<[KeyPart; 4]>);

impl RowKey {
    /// Builds the key for `row` from `columns`, in column order.
    ///
    /// Positions past the end of a column contribute a missing part.
    pub fn from_columns(columns: &[ColumnRef], row: usize) -> Self {
        let part = |c: &ColumnRef| c.borrow().get(row).map_or(KeyPart::Missing, KeyPart::from);
        Self(columns.iter().map(part).collect())
    }

    /// Builds a key from loose values.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        Self(values.into_iter().map(KeyPart::from).collect())
    }

    /// Returns `true` if any part is missing.
    pub fn has_missing(&self) -> bool {
        self.0.iter().any(|p| matches!(p, KeyPart::Missing))
    }

    /// The key parts, in column order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::Column;

    #[test]
    fn keys_are_structural_not_textual() {
        // A separator-joined string key would make these two collide.
        let a = RowKey::from_values(&[Value::from("a\u{1f}b"), Value::from("c")]);
        let b = RowKey::from_values(&[Value::from("a"), Value::from("b\u{1f}c")]);
        assert_ne!(a, b);
    }

    #[test]
    fn numbers_and_text_are_distinct() {
        let n = RowKey::from_values(&[Value::from(3.0)]);
        let t = RowKey::from_values(&[Value::from("3")]);
        assert_ne!(n, t);
    }

    #[test]
    fn nan_and_negative_zero_normalise() {
        assert_eq!(
            RowKey::from_values(&[Value::from(f64::NAN)]),
            RowKey::from_values(&[Value::Missing])
        );
        assert_eq!(
            RowKey::from_values(&[Value::from(-0.0)]),
            RowKey::from_values(&[Value::from(0.0)])
        );
        let partial = RowKey::from_values(&[Value::from(1.0), Value::Missing]);
        assert!(partial.has_missing());
    }

    #[test]
    fn from_columns_reads_one_row() {
        let a = ColumnRef::new(Column::from_iter([1.0, 2.0]));
        let b = ColumnRef::new(Column::from(vec![Value::from("x"), Value::from("y")]));
        let k = RowKey::from_columns(&[a, b], 1);
        let expected = [Value::from(2.0), Value::from("y")];
        assert_eq!(k, RowKey::from_values(&expected));
        assert_eq!(k.parts().len(), 2);
    }
}
