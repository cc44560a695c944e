//! Money types with exact minor-unit arithmetic.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Ledger amounts are `i64` minor units (cents); `Decimal` is used only
//! at the boundary where providers report major-unit amounts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Indonesian Rupiah (zero-decimal)
    Idr,
    /// Japanese Yen (zero-decimal)
    Jpy,
}

impl Currency {
    /// All currencies the platform settles in.
    pub const ALL: [Self; 5] = [Self::Usd, Self::Eur, Self::Gbp, Self::Idr, Self::Jpy];

    /// Number of decimal places in the minor unit (ISO 4217 exponent).
    #[must_use]
    pub const fn minor_unit_exponent(self) -> u32 {
        match self {
            Self::Usd | Self::Eur | Self::Gbp => 2,
            Self::Idr | Self::Jpy => 0,
        }
    }

    /// Minor units per major unit (100 for USD, 1 for JPY).
    #[must_use]
    pub const fn minor_units_per_major(self) -> i64 {
        10i64.pow(self.minor_unit_exponent())
    }

    /// Converts a minor-unit amount to a major-unit decimal.
    #[must_use]
    pub fn to_major(self, minor: i64) -> Decimal {
        Decimal::new(minor, self.minor_unit_exponent())
    }

    /// Converts a major-unit decimal to minor units.
    ///
    /// Returns `None` if the amount has sub-minor-unit precision or
    /// overflows `i64`.
    #[must_use]
    pub fn to_minor(self, major: Decimal) -> Option<i64> {
        let scaled = major * Decimal::from(self.minor_units_per_major());
        if scaled.fract().is_zero() {
            scaled.trunc().to_i64()
        } else {
            None
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Gbp => write!(f, "GBP"),
            Self::Idr => write!(f, "IDR"),
            Self::Jpy => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "IDR" => Ok(Self::Idr),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// A monetary amount in minor units with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., cents).
    pub minor: i64,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Returns the amount as a major-unit decimal.
    #[must_use]
    pub fn to_major(&self) -> Decimal {
        self.currency.to_major(self.minor)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_major(), self.currency)
    }
}
