//! Monetary amounts in integer minor units.
//!
//! Prices and totals are stored as a count of the smallest currency unit
//! (cents), so sums and products never drift the way floating-point amounts do.
//! On the wire an amount is a plain JSON number with at most two decimal places
//! (`9.99`). Parsing and printing go through `rust_decimal` with serde_json's
//! arbitrary-precision numbers, so the text is converted exactly in both directions.

use core::fmt;

use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// Number of decimal places in an amount.
const SCALE: u32 = 2;

/// Number of minor units per major unit.
const MINOR_PER_MAJOR: u64 = 100;

/// Non-negative monetary amount, in minor units (e.g. cents).
///
/// Capped at [`Money::MAX`] so every amount fits a Postgres `BIGINT`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest representable amount (`i64::MAX` minor units).
    pub const MAX: Money = Money(i64::MAX as u64);

    pub const fn from_minor_units(minor: u64) -> Self {
        Self(minor)
    }

    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Convert a decimal amount (`9.99`) into minor units.
    ///
    /// Rejects negative values, more than two decimal places, and anything above
    /// [`Money::MAX`].
    pub fn from_decimal(value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::validation("amount cannot be negative"));
        }
        if value.normalize().scale() > SCALE {
            return Err(DomainError::validation(
                "amount cannot have more than two decimal places",
            ));
        }

        value
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|minor| minor.to_u64())
            .map(Money)
            .filter(|money| *money <= Money::MAX)
            .ok_or_else(|| DomainError::validation("amount is too large"))
    }

    /// Decimal representation used on the wire, always with two decimal places.
    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), SCALE)
    }

    /// `None` when the sum exceeds [`Money::MAX`].
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .filter(|money| *money <= Money::MAX)
    }

    /// Line amount: unit price times quantity. `None` above [`Money::MAX`].
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0
            .checked_mul(u64::from(quantity))
            .map(Money)
            .filter(|money| *money <= Money::MAX)
    }

    /// Sum of amounts; `None` on overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_PER_MAJOR,
            self.0 % MINOR_PER_MAJOR
        )
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::arbitrary_precision::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::arbitrary_precision::deserialize(deserializer)?;
        Money::from_decimal(value).map_err(serde::de::Error::custom)
    }
}
