//! Tax profile configuration: bracket tables, rebates, UIF, VAT

use crate::money::{Currency, Money, MoneyError};
use serde::{Deserialize, Serialize};

/// Stable tax-profile identifier within one scenario input.
pub type TaxProfileId = u32;

/// One progressive tax bracket.
///
/// Brackets are an ordered, non-overlapping table that fully partitions
/// `[0, inf)`: the first `min` is zero, each `max` equals the next bracket's
/// `min`, and the last bracket is open-ended (`max` unset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min: Money,
    #[serde(default)]
    pub max: Option<Money>,
    /// Marginal rate applied above `min`, as a fraction.
    pub rate: f64,
    /// Tax accumulated by all brackets below this one.
    pub base_tax: Money,
}

/// Age-based annual rebates subtracted from gross tax. Which rebates apply
/// is decided by the caller when assembling the profile; the calculator
/// just sums whatever is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxRebates {
    #[serde(default)]
    pub primary: Option<Money>,
    #[serde(default)]
    pub secondary: Option<Money>,
    #[serde(default)]
    pub tertiary: Option<Money>,
}

impl TaxRebates {
    /// Sum of all applicable rebates.
    pub fn total(&self, currency: Currency) -> Result<Money, MoneyError> {
        let mut total = Money::zero(currency);
        for rebate in [self.primary, self.secondary, self.tertiary].into_iter().flatten() {
            total = total.checked_add(rebate)?;
        }
        Ok(total)
    }
}

/// A PAYE-style withholding profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxProfile {
    pub id: TaxProfileId,
    pub name: String,
    pub brackets: Vec<TaxBracket>,
    /// Statutory insurance contribution rate, as a fraction.
    #[serde(default)]
    pub uif_rate: f64,
    /// Monthly cap on the UIF contribution.
    #[serde(default)]
    pub uif_cap_monthly: Option<Money>,
    /// Carried for expense-side use; not applied to personal income flows.
    #[serde(default)]
    pub vat_rate: f64,
    #[serde(default)]
    pub rebates: TaxRebates,
}
