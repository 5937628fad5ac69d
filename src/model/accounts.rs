//! Account snapshots and compounding frequencies

use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Stable account identifier within one scenario input.
pub type AccountId = u32;

/// How an account's annual interest/growth rate compounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compounding {
    Daily,
    Monthly,
    Quarterly,
    Annual,
}

impl Compounding {
    /// Effective one-month growth rate for an annual rate given as a
    /// fraction (0.10 = 10%). The month loop applies this rate once per
    /// period regardless of the underlying compounding granularity; daily
    /// compounding uses the average month length of 30.42 days.
    pub fn periodic_rate(&self, annual_rate: f64) -> f64 {
        match self {
            Compounding::Daily => (1.0 + annual_rate / 365.0).powf(30.42) - 1.0,
            Compounding::Monthly => annual_rate / 12.0,
            Compounding::Quarterly => (1.0 + annual_rate / 4.0).powf(1.0 / 3.0) - 1.0,
            Compounding::Annual => (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0,
        }
    }
}

/// One account balance snapshot.
///
/// Liabilities store the owed amount as a positive magnitude; their signed
/// net-worth contribution is the negated balance. Balances are mutated only
/// by the account ledger during a run, on the ledger's own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub currency: Currency,
    #[serde(default)]
    pub is_liability: bool,
    pub balance: Money,
    /// Annual interest/growth rate as a fraction (0.10 = 10%).
    #[serde(default)]
    pub annual_interest_rate: f64,
    #[serde(default)]
    pub compounding: Option<Compounding>,
    #[serde(default)]
    pub monthly_fee: Option<Money>,
}
