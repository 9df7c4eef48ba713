//! Exact money amounts stored as a whole number of cents.
//!
//! Amounts never go through binary floating point. User input is parsed as a
//! [Decimal] and converted into cents, and amounts are stored in the database
//! as INTEGER cents.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// The largest amount accepted for a single transaction, 99,999,999.99.
pub const MAX_AMOUNT: Amount = Amount(9_999_999_999);

/// An amount of money with exactly two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero dollars and zero cents.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a number of cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether the amount is below zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Convert a user supplied decimal into an amount.
    ///
    /// Trailing zeros are ignored, so "12.500" is accepted as 12.50.
    ///
    /// # Errors
    /// Returns a:
    /// - [ValidationError::NegativeAmount] if `value` is below zero,
    /// - [ValidationError::TooManyDecimalPlaces] if `value` has fractional cents,
    /// - or [ValidationError::AmountTooLarge] if `value` is larger than [MAX_AMOUNT].
    pub fn from_decimal(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeAmount);
        }

        let value = value.normalize();

        if value.scale() > 2 {
            return Err(ValidationError::TooManyDecimalPlaces);
        }

        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or(ValidationError::AmountTooLarge)?;
        let amount = Amount(cents);

        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge);
        }

        Ok(amount)
    }

    /// The amount as a decimal with a scale of two, e.g. `12.30`.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

/// Parse the text of an amount form field as a plain decimal, e.g. "12.50".
///
/// Only digits with an optional leading minus sign and one decimal point are
/// accepted. Scientific notation ("1e2"), a leading plus sign and thousands
/// separators are rejected. The sign is kept so that [Amount::from_decimal]
/// can report negative amounts.
///
/// # Errors
/// Returns [ValidationError::InvalidAmount] if `text` is not a plain decimal.
pub fn parse_decimal(text: &str) -> Result<Decimal, ValidationError> {
    let text = text.trim();
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    let is_plain_decimal = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|byte| byte.is_ascii_digit())
        && fraction.bytes().all(|byte| byte.is_ascii_digit());

    if !is_plain_decimal {
        return Err(ValidationError::InvalidAmount);
    }

    Decimal::from_str(text).map_err(|_| ValidationError::InvalidAmount)
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_decimal().fmt(f)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Amount)
    }
}
