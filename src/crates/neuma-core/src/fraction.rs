use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Rational number representation for exact durations and offsets
///
/// Fractions are always kept in lowest terms with a positive denominator, so
/// structural equality is numeric equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    pub const ZERO: Fraction = Fraction {
        numerator: 0,
        denominator: 1,
    };

    pub const ONE: Fraction = Fraction {
        numerator: 1,
        denominator: 1,
    };

    /// Create a new fraction and simplify it
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is zero. Use [`Fraction::checked_new`] for
    /// untrusted input.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self::checked_new(numerator, denominator).expect("Denominator cannot be zero")
    }

    /// Create a new fraction, returning `None` for a zero denominator or
    /// when the reduced value does not fit (`i64::MIN / -1`)
    pub fn checked_new(numerator: i64, denominator: i64) -> Option<Self> {
        Self::from_wide(i128::from(numerator), i128::from(denominator))
    }

    /// Create a fraction from a whole number
    pub fn from_int(n: i64) -> Self {
        Fraction {
            numerator: n,
            denominator: 1,
        }
    }

    /// Parse a decimal literal such as `0.75` or `-2.5` exactly
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let scale = 10i64.checked_pow(frac.len() as u32)?;
        let whole: i64 = whole.parse().ok()?;
        let frac_value: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
        let numerator = whole.checked_mul(scale)?.checked_add(frac_value)?;
        let numerator = if negative { -numerator } else { numerator };
        Fraction::checked_new(numerator, scale)
    }

    /// Convert to float
    pub fn to_float(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Build from wide intermediates, `None` if the reduced value leaves i64
    fn from_wide(numerator: i128, denominator: i128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let mut a = numerator.abs();
        let mut b = denominator.abs();
        while b != 0 {
            let temp = b;
            b = a % b;
            a = temp;
        }
        let sign = if denominator < 0 { -1 } else { 1 };
        Some(Fraction {
            numerator: i64::try_from(sign * numerator / a).ok()?,
            denominator: i64::try_from(sign * denominator / a).ok()?,
        })
    }

    /// Addition, `None` on overflow
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * d + c * b, b * d)
    }

    /// Subtraction, `None` on overflow
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * d - c * b, b * d)
    }

    /// Multiplication, `None` on overflow
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * c, b * d)
    }

    /// Division, `None` on overflow or when `other` is zero
    pub fn checked_div(self, other: Self) -> Option<Self> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * d, b * c)
    }

    fn wide(self, other: Self) -> (i128, i128, i128, i128) {
        (
            i128::from(self.numerator),
            i128::from(self.denominator),
            i128::from(other.numerator),
            i128::from(other.denominator),
        )
    }

    /// Get the reciprocal
    ///
    /// # Panics
    ///
    /// Panics if the fraction is zero.
    pub fn reciprocal(self) -> Self {
        Fraction::new(self.denominator, self.numerator)
    }

    /// Check if fraction is zero
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Check if fraction is negative
    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        Fraction::new(self.numerator.abs(), self.denominator)
    }

    /// Round down to the nearest integer
    pub fn floor(self) -> i64 {
        self.numerator.div_euclid(self.denominator)
    }

    /// Round up to the nearest integer
    pub fn ceil(self) -> i64 {
        -(-self.numerator).div_euclid(self.denominator)
    }

    /// Check if the fraction is a whole number
    pub fn is_integer(&self) -> bool {
        self.denominator == 1
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// Error returned when a string is not a fraction literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fraction literal '{0}'")]
pub struct ParseFractionError(pub String);

impl FromStr for Fraction {
    type Err = ParseFractionError;

    /// Accepts `n`, `n/d` and decimal literals such as `0.75`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.split_once('/') {
            Some((num, den)) => {
                let num: i64 = num.trim().parse().map_err(|_| ParseFractionError(s.into()))?;
                let den: i64 = den.trim().parse().map_err(|_| ParseFractionError(s.into()))?;
                Fraction::checked_new(num, den)
            }
            None => Fraction::from_decimal_str(s),
        };
        parsed.ok_or_else(|| ParseFractionError(s.to_string()))
    }
}

impl From<Fraction> for String {
    fn from(f: Fraction) -> Self {
        f.to_string()
    }
}

impl TryFrom<String> for Fraction {
    type Error = ParseFractionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction::from_int(n)
    }
}

impl From<(i64, i64)> for Fraction {
    fn from((num, den): (i64, i64)) -> Self {
        Fraction::new(num, den)
    }
}

// Operators panic when the result leaves the i64 range; use the `checked_*`
// methods on untrusted values.

impl Add for Fraction {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(other).expect("Fraction addition overflowed")
    }
}

impl Sub for Fraction {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(other).expect("Fraction subtraction overflowed")
    }
}

impl Mul for Fraction {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        self.checked_mul(other).expect("Fraction multiplication overflowed")
    }
}

impl Div for Fraction {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        self.checked_div(other).expect("Fraction division by zero or overflow")
    }
}

impl Sum for Fraction {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Fraction::ZERO, |acc, f| acc + f)
    }
}

impl<'a> Sum<&'a Fraction> for Fraction {
    fn sum<I: Iterator<Item = &'a Fraction>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying keeps the order
        let (a, b, c, d) = self.wide(*other);
        (a * d).cmp(&(c * b))
    }
}
