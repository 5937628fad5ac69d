//! Fixed-point money values
//!
//! Balances are stored as scaled integers (minor units, i.e. cents) tagged
//! with a currency code, never as binary floating point, so hundreds of
//! compounding periods cannot accumulate representation drift. Rate
//! multiplication rounds half-to-even at the minor-unit boundary after each
//! operation. Cross-currency arithmetic fails with `CurrencyMismatch`; the
//! engine assumes single-currency scenarios (no FX conversion).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised at the money layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),
}

/// Three-letter currency code (ISO 4217 style), stored inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// Parse a three-letter alphabetic code; normalized to upper case.
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // The constructor only accepts ASCII alphabetic bytes.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

/// A currency amount in scaled minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    pub fn from_minor(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Whole-unit constructor (e.g. rands, dollars).
    pub fn from_major(major: i64, currency: Currency) -> Self {
        Self {
            minor: major * 100,
            currency,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    pub fn minor(&self) -> i64 {
        self.minor
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }

    pub fn abs(&self) -> Self {
        Self {
            minor: self.minor.abs(),
            currency: self.currency,
        }
    }

    pub fn negate(&self) -> Self {
        Self {
            minor: -self.minor,
            currency: self.currency,
        }
    }

    /// Add two amounts of the same currency.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Money {
            minor: self.minor + other.minor,
            currency: self.currency,
        })
    }

    /// Subtract an amount of the same currency.
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Money {
            minor: self.minor - other.minor,
            currency: self.currency,
        })
    }

    /// Multiply by a rate, rounding half-to-even at the minor-unit boundary.
    pub fn mul_rate(self, rate: f64) -> Money {
        let scaled = (self.minor as f64) * rate;
        Money {
            minor: scaled.round_ties_even() as i64,
            currency: self.currency,
        }
    }

    /// Same-currency comparison.
    pub fn checked_cmp(self, other: Money) -> Result<Ordering, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.minor.cmp(&other.minor))
    }

    /// Lossy view in major units, for display and CSV export only.
    pub fn to_major_f64(&self) -> f64 {
        self.minor as f64 / 100.0
    }

    fn ensure_same_currency(&self, other: Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

impl PartialOrd for Money {
    /// Ordering is only defined within one currency.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.minor.cmp(&other.minor))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.to_major_f64(), self.currency)
    }
}
