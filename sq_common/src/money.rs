use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const CURRENCY_CODE: &str = "INR";
pub const CURRENCY_CODE_LOWER: &str = "inr";

//--------------------------------------       Money       -----------------------------------------------------------
/// An exact amount of money, stored as an integer number of cents (hundredths of the major currency unit).
///
/// Clients exchange amounts as decimal numbers (e.g. `120.50`), so `Money` serializes to and from JSON as a float of
/// major units. All arithmetic and storage happens on the integer cent value, which keeps totals exact.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a money amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{:.2}", self.0 as f64 / 100.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major_units())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::try_from_major_units(value).map_err(serde::de::Error::custom)
    }
}

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole major units (e.g. rupees), without fractional cents.
    pub fn from_major_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Converts a client-supplied decimal amount, rounding to the nearest cent.
    pub fn try_from_major_units(units: f64) -> Result<Self, MoneyConversionError> {
        if !units.is_finite() {
            return Err(MoneyConversionError(format!("{units} is not a finite amount")));
        }
        let cents = (units * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return Err(MoneyConversionError(format!("{units} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(cents as i64))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Absolute difference between two amounts, in cents.
    pub fn abs_diff(&self, other: Money) -> i64 {
        (self.0 - other.0).abs()
    }
}
