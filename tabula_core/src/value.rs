// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamically typed scalar cell values.

extern crate alloc;

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

/// A single table cell.
///
/// `Value` is a closed set of scalars. Coercions never mutate the receiver; they produce a
/// new number, string or boolean.
///
/// "Missing" has two spellings: the explicit [`Value::Missing`] marker, and a `Number` holding
/// `NaN`. [`Value::is_missing`] treats both the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No data.
    #[default]
    Missing,
    /// A 64-bit float. Integers are stored here as well.
    Number(f64),
    /// A boolean.
    Bool(bool),
    /// A string. Cloning is cheap; the text is shared.
    Text(Rc<str>),
}

impl Value {
    /// Creates a text value.
    pub fn text(s: impl AsRef<str>) -> Self {
        Self::Text(Rc::from(s.as_ref()))
    }

    /// Returns `true` for the absence marker and for `Number(NaN)`.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(x) => x.is_nan(),
            Self::Bool(_) | Self::Text(_) => false,
        }
    }

    /// Coerces to a number.
    ///
    /// Text is parsed after trimming surrounding whitespace; text that does not parse, and
    /// missing values, yield `NaN`. Booleans map to `1` and `0`.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Missing => f64::NAN,
            Self::Number(x) => *x,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    /// Coerces to a string using the canonical formatting (see the `Display` impl).
    pub fn to_text(&self) -> String {
        use alloc::string::ToString;
        self.to_string()
    }

    /// Coerces to a boolean.
    ///
    /// Numbers are true when non-zero and not `NaN`; text is true when non-empty; missing is
    /// false.
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Missing => false,
            Self::Number(x) => *x != 0.0 && !x.is_nan(),
            Self::Bool(b) => *b,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Returns the number if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the string slice if this is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical text form.
///
/// - missing renders as the empty string,
/// - integral numbers inside the `i64` range render without a decimal point (`3.0` is `"3"`),
/// - other finite numbers use the shortest round-trip decimal, in exponent form below `1e-4`
///   or from `1e21` upward,
/// - `NaN` and infinities render as `NaN`, `+Inf` and `-Inf`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(x) => fmt_number(*x, f),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// 2^63; every integral f64 strictly below it in magnitude fits in an i64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn fmt_number(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("NaN");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "+Inf" } else { "-Inf" });
    }
    if (-I64_BOUND..I64_BOUND).contains(&x) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "range checked above; truncation is the integrality test"
        )]
        let i = x as i64;
        if i as f64 == x {
            return write!(f, "{i}");
        }
    }
    let a = x.abs();
    if !(1e-4..1e21).contains(&a) {
        write!(f, "{x:e}")
    } else {
        write!(f, "{x}")
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Number(f64::from(x))
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Self::Number(f64::from(x))
    }
}

impl From<u32> for Value {
    fn from(x: u32) -> Self {
        Self::Number(f64::from(x))
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Self::Number(x as f64)
    }
}

impl From<usize> for Value {
    fn from(x: usize) -> Self {
        Self::Number(x as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Rc::from(s))
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;

    use super::*;

    #[test]
    fn text_parses_to_number_after_trimming() {
        assert_eq!(Value::from("3.0").to_number(), 3.0);
        assert_eq!(Value::from("  -2.5\t").to_number(), -2.5);
        assert!(Value::from("abc").to_number().is_nan());
        assert!(Value::from("").to_number().is_nan());
    }

    #[test]
    fn missing_coerces_to_nan_and_empty_text() {
        assert!(Value::Missing.to_number().is_nan());
        assert_eq!(Value::Missing.to_text(), "");
        assert!(!Value::Missing.to_bool());
    }

    #[test]
    fn integral_numbers_render_without_decimal_point() {
        assert_eq!(Value::from(3.0).to_text(), "3");
        assert_eq!(Value::from(-0.0).to_text(), "0");
        assert_eq!(Value::from(-42.0).to_text(), "-42");
        assert_eq!(Value::from(1e15).to_text(), "1000000000000000");
    }

    #[test]
    fn fractional_numbers_use_shortest_round_trip_form() {
        assert_eq!(Value::from(0.1).to_text(), "0.1");
        assert_eq!(Value::from(2.5).to_text(), "2.5");
        assert_eq!(Value::from(1.0e-7).to_text(), "1e-7");
        assert_eq!(Value::from(1.5e22).to_text(), "1.5e22");
        let x = 0.1 + 0.2;
        assert_eq!(Value::from(x).to_text().parse::<f64>().unwrap(), x);
    }

    #[test]
    fn non_finite_numbers_have_fixed_spellings() {
        assert_eq!(Value::from(f64::NAN).to_text(), "NaN");
        assert_eq!(Value::from(f64::INFINITY).to_text(), "+Inf");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_text(), "-Inf");
    }

    #[test]
    fn nan_number_counts_as_missing() {
        assert!(Value::from(f64::NAN).is_missing());
        assert!(Value::Missing.is_missing());
        assert!(!Value::from(0.0).is_missing());
        assert!(!Value::from("").is_missing());
    }

    #[test]
    fn bool_coercions() {
        assert_eq!(Value::from(true).to_number(), 1.0);
        assert_eq!(Value::from(false).to_text(), "false");
        assert!(Value::from(2.0).to_bool());
        assert!(!Value::from(f64::NAN).to_bool());
        assert!(Value::from("x").to_bool());
        assert!(!Value::from("").to_bool());
    }

    #[test]
    fn accessors_do_not_coerce() {
        assert_eq!(Value::from(2.5).as_number(), Some(2.5));
        assert_eq!(Value::from("2.5").as_number(), None);
        assert_eq!(Value::from("abc").as_text(), Some("abc"));
        assert_eq!(Value::from(1.0).as_text(), None);
        assert_eq!(Value::Missing.as_number(), None);
    }

    #[test]
    fn option_maps_none_to_missing() {
        assert_eq!(Value::from(None::<f64>), Value::Missing);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
        assert_eq!(Value::from(Some(7_i32)).to_string(), "7");
    }
}
