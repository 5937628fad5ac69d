//! Scenario definition and the full simulation input snapshot

use crate::model::accounts::Account;
use crate::model::flows::{ExpenseDefinition, IncomeSource, InvestmentContribution};
use crate::model::goals::FinancialGoal;
use crate::model::tax::TaxProfile;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named, dated configuration of accounts and flows to simulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: u32,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn default_inflation_rate() -> f64 {
    0.05
}

/// Scenario-wide default rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    /// Applied to inflation-adjusted expenses, as a fraction per year.
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            inflation_rate: default_inflation_rate(),
        }
    }
}

/// The complete, already-validated input snapshot for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub scenario: Scenario,
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub income_sources: Vec<IncomeSource>,
    #[serde(default)]
    pub expenses: Vec<ExpenseDefinition>,
    #[serde(default)]
    pub investments: Vec<InvestmentContribution>,
    #[serde(default)]
    pub tax_profiles: Vec<TaxProfile>,
    #[serde(default)]
    pub goals: Vec<FinancialGoal>,
    #[serde(default)]
    pub assumptions: Assumptions,
}
