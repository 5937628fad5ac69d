//! Financial goal definitions checked by the milestone detector

use crate::model::accounts::AccountId;
use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_priority() -> u32 {
    1
}

/// A target amount to reach within the projection horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub name: String,
    pub target_amount: Money,
    #[serde(default)]
    pub current_amount: Option<Money>,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// Track a single account's signed balance instead of total net worth.
    #[serde(default)]
    pub tracked_account_id: Option<AccountId>,
}
