//! PAYE-style tax and UIF withholding
//!
//! Computes withholding from an annualized gross income against a bracket
//! table with age-based rebates, plus a capped statutory-insurance (UIF)
//! contribution. Which rebates apply is decided by the caller assembling
//! the profile; bracket selection here is purely by income. VAT is carried
//! on the profile but never applied to personal income flows.

use crate::error::EngineError;
use crate::model::TaxProfile;
use crate::money::Money;
use std::cmp::Ordering;

/// Annual tax and UIF withheld from one income stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Withholding {
    pub tax: Money,
    pub uif: Money,
}

impl Withholding {
    pub fn total(&self) -> Result<Money, EngineError> {
        Ok(self.tax.checked_add(self.uif)?)
    }
}

/// Annual withholding for an annualized gross income.
///
/// Bracket tax is `base_tax + rate x (gross - bracket.min)` for the bracket
/// containing the gross, less the sum of the profile's rebates, floored at
/// zero. Annual UIF is `gross x uif_rate` capped at twelve monthly caps.
pub fn annual_withholding(
    annual_gross: Money,
    profile: &TaxProfile,
) -> Result<Withholding, EngineError> {
    let currency = annual_gross.currency();
    let zero = Money::zero(currency);

    if annual_gross.checked_cmp(zero)? != Ordering::Greater {
        return Ok(Withholding { tax: zero, uif: zero });
    }

    // Brackets are validated at run setup: contiguous from zero, only the
    // top bracket open-ended. Walk from the top and take the first bracket
    // the gross reaches.
    let mut tax = zero;
    for bracket in profile.brackets.iter().rev() {
        if annual_gross.checked_cmp(bracket.min)? != Ordering::Less {
            let above_min = annual_gross.checked_sub(bracket.min)?;
            tax = bracket.base_tax.checked_add(above_min.mul_rate(bracket.rate))?;
            break;
        }
    }

    // Rebates reduce tax, never below zero.
    let rebates = profile.rebates.total(currency)?;
    tax = tax.checked_sub(rebates)?;
    if tax.is_negative() {
        tax = zero;
    }

    let mut uif = annual_gross.mul_rate(profile.uif_rate);
    if let Some(cap_monthly) = profile.uif_cap_monthly {
        let cap_annual = cap_monthly.mul_rate(12.0);
        if uif.checked_cmp(cap_annual)? == Ordering::Greater {
            uif = cap_annual;
        }
    }

    Ok(Withholding { tax, uif })
}

/// Monthly PAYE-equivalent withholding: the annual figures divided by 12.
pub fn monthly_withholding(
    annual_gross: Money,
    profile: &TaxProfile,
) -> Result<Withholding, EngineError> {
    let annual = annual_withholding(annual_gross, profile)?;
    Ok(Withholding {
        tax: annual.tax.mul_rate(1.0 / 12.0),
        uif: annual.uif.mul_rate(1.0 / 12.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaxBracket, TaxRebates};
    use crate::money::Currency;

    fn zar() -> Currency {
        Currency::new("ZAR").unwrap()
    }

    fn rand(major: i64) -> Money {
        Money::from_major(major, zar())
    }

    /// South African 2024/25 PAYE table with the primary rebate.
    fn sa_profile() -> TaxProfile {
        let brackets = vec![
            (0, Some(237_100), 0.18, 0),
            (237_100, Some(370_500), 0.26, 42_678),
            (370_500, Some(512_800), 0.31, 77_362),
            (512_800, Some(673_000), 0.36, 121_475),
            (673_000, Some(857_900), 0.39, 179_147),
            (857_900, Some(1_817_000), 0.41, 251_258),
            (1_817_000, None, 0.45, 644_489),
        ]
        .into_iter()
        .map(|(min, max, rate, base)| TaxBracket {
            min: rand(min),
            max: max.map(rand),
            rate,
            base_tax: rand(base),
        })
        .collect();

        TaxProfile {
            id: 1,
            name: "SA 2024/25".to_string(),
            brackets,
            uif_rate: 0.01,
            uif_cap_monthly: Some(Money::from_minor(17_712, zar())),
            vat_rate: 0.15,
            rebates: TaxRebates {
                primary: Some(rand(17_235)),
                secondary: None,
                tertiary: None,
            },
        }
    }

    #[test]
    fn test_first_bracket_with_rebate() {
        // R200,000 x 18% = R36,000 - R17,235 = R18,765/yr -> R1,563.75/mo
        let w = monthly_withholding(rand(200_000), &sa_profile()).unwrap();
        assert_eq!(w.tax.minor(), 156_375);
    }

    #[test]
    fn test_mid_bracket() {
        // R370,500 lands the bracket-2 boundary: R42,678 + 26% x R133,400
        // = R77,362 - R17,235 = R60,127/yr
        let w = annual_withholding(rand(370_500), &sa_profile()).unwrap();
        assert_eq!(w.tax.minor(), 6_012_700);
    }

    #[test]
    fn test_rebate_floors_tax_at_zero() {
        // R95,750 x 18% = R17,235 = primary rebate exactly
        let w = annual_withholding(rand(95_750), &sa_profile()).unwrap();
        assert!(w.tax.is_zero());

        let w = annual_withholding(rand(50_000), &sa_profile()).unwrap();
        assert!(w.tax.is_zero());
    }

    #[test]
    fn test_zero_and_negative_gross() {
        let w = annual_withholding(rand(0), &sa_profile()).unwrap();
        assert!(w.tax.is_zero());
        assert!(w.uif.is_zero());

        let w = annual_withholding(rand(-50_000), &sa_profile()).unwrap();
        assert!(w.tax.is_zero());
        assert!(w.uif.is_zero());
    }

    #[test]
    fn test_uif_capped_monthly() {
        // R20,000/mo gross = R240,000/yr; 1% exceeds the R177.12 cap
        let w = monthly_withholding(rand(240_000), &sa_profile()).unwrap();
        assert_eq!(w.uif.minor(), 17_712);

        // R10,000/mo gross stays below the cap: R100/mo
        let w = monthly_withholding(rand(120_000), &sa_profile()).unwrap();
        assert_eq!(w.uif.minor(), 10_000);
    }

    #[test]
    fn test_tax_is_monotonic_in_income() {
        let profile = sa_profile();
        let incomes = [
            0, 50_000, 95_750, 200_000, 237_100, 370_500, 512_800, 673_000, 857_900, 1_000_000,
            1_817_000, 3_000_000,
        ];
        let mut previous = Money::zero(zar());
        for income in incomes {
            let w = annual_withholding(rand(income), &profile).unwrap();
            assert!(
                w.tax >= previous,
                "tax decreased between incomes at {}",
                income
            );
            previous = w.tax;
        }
    }

    #[test]
    fn test_top_bracket() {
        // R3,000,000: R644,489 + 45% x R1,183,000 = R1,176,839 - R17,235
        let w = annual_withholding(rand(3_000_000), &sa_profile()).unwrap();
        assert_eq!(w.tax.minor(), 115_960_400);
    }
}
