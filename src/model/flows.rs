//! Scheduled cash-flow definitions: income, expenses, investments

use crate::model::accounts::AccountId;
use crate::model::tax::TaxProfileId;
use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable flow identifier, unique within its own collection.
pub type FlowId = u32;

/// Posting frequency of a cash flow.
///
/// The engine is month-grained: weekly and biweekly flows are folded into a
/// single monthly posting via a fixed multiplier rather than modelled at
/// sub-month granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    /// Number of payments folded into one monthly posting.
    pub fn monthly_multiplier(&self) -> f64 {
        match self {
            Frequency::Weekly => 4.33,
            Frequency::Biweekly => 2.17,
            _ => 1.0,
        }
    }

    /// Payments per year, used to annualize a per-payment amount for tax.
    /// A `once` payment is its own annual gross.
    pub fn annualized_multiplier(&self) -> f64 {
        match self {
            Frequency::Once => 1.0,
            Frequency::Weekly => 52.0,
            Frequency::Biweekly => 26.0,
            Frequency::Monthly => 12.0,
            Frequency::Quarterly => 4.0,
            Frequency::Annually => 1.0,
        }
    }
}

/// Rule that deactivates a recurring flow.
///
/// A closed sum type: the evaluator matches exhaustively. Evaluated after
/// the month's posting, so a flow still fires in the month it crosses its
/// threshold and stays inactive for the rest of the run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndCondition {
    #[default]
    None,
    /// Active while the simulation month is on or before this date's month.
    UntilDate { date: NaiveDate },
    /// Active while the cumulative amount posted stays below the threshold.
    /// The final posting may overshoot; it is not clipped.
    UntilAmount { threshold: Money },
    /// Active while the referenced account's balance magnitude is non-zero.
    UntilAccountSettled { account_id: AccountId },
}

/// A recurring or one-time income stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: FlowId,
    pub name: String,
    /// Gross amount per payment, before tax and annual increase scaling.
    pub base_amount: Money,
    /// Withholding applies only when pre-tax and a profile is attached.
    #[serde(default)]
    pub is_pre_tax: bool,
    pub frequency: Frequency,
    /// Annual raise as a fraction (0.05 = 5% per year).
    #[serde(default)]
    pub annual_increase_rate: f64,
    #[serde(default)]
    pub tax_profile_id: Option<TaxProfileId>,
    pub target_account_id: AccountId,
    /// First payment month. Required when frequency is `once`.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// A recurring or one-time expense debited from a linked account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDefinition {
    pub id: FlowId,
    pub name: String,
    pub amount_value: Money,
    pub frequency: Frequency,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_tax_deductible: bool,
    /// Scale the amount by the default inflation rate over elapsed years.
    #[serde(default)]
    pub inflation_adjusted: bool,
    pub linked_account_id: AccountId,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_condition: EndCondition,
}

/// A recurring or one-time transfer from a source to a target account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentContribution {
    pub id: FlowId,
    pub name: String,
    pub amount: Money,
    pub frequency: Frequency,
    pub source_account_id: AccountId,
    pub target_account_id: AccountId,
    /// Annual escalation of the contribution, as a fraction.
    #[serde(default)]
    pub annual_increase_rate: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_condition: EndCondition,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_monthly_multipliers() {
        assert_eq!(Frequency::Weekly.monthly_multiplier(), 4.33);
        assert_eq!(Frequency::Biweekly.monthly_multiplier(), 2.17);
        assert_eq!(Frequency::Monthly.monthly_multiplier(), 1.0);
        assert_eq!(Frequency::Once.monthly_multiplier(), 1.0);
    }

    #[test]
    fn test_end_condition_serde_tagged() {
        let zar = Currency::new("ZAR").unwrap();
        let cond = EndCondition::UntilAmount {
            threshold: Money::from_major(15_000, zar),
        };
        let json = serde_json::to_string(&cond).unwrap();
        assert!(json.contains("until_amount"));
        let back: EndCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(cond, back);
    }

    #[test]
    fn test_end_condition_default_is_none() {
        assert_eq!(EndCondition::default(), EndCondition::None);
    }
}
