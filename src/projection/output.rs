//! Projection series, summary statistics, and the run outcome

use crate::milestones::MilestoneResult;
use crate::model::AccountId;
use crate::money::Money;
use crate::period::Period;
use serde::Serialize;
use std::collections::BTreeMap;

/// One account's contribution to a single projection month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccountPoint {
    /// Signed balance: liabilities appear negated.
    pub balance: Money,
    pub income: Money,
    pub expenses: Money,
    /// Signed net-worth effect of the month's interest.
    pub interest: Money,
}

/// The state of the ledger at the end of one simulated month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub period: Period,
    pub net_worth: Money,
    pub total_income: Money,
    pub total_expenses: Money,
    pub total_interest: Money,
    pub accounts: BTreeMap<AccountId, AccountPoint>,
}

/// Whole-run aggregates over the projection series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub start_net_worth: Money,
    pub end_net_worth: Money,
    pub total_growth: Money,
    /// Compound annual growth rate. Only meaningful when the run starts
    /// from positive net worth; see `annualized_return_valid`.
    pub annualized_return: f64,
    pub annualized_return_valid: bool,
    /// Simple average of month-over-month relative changes. Months with
    /// zero previous net worth are skipped.
    pub avg_monthly_growth_rate: f64,
    pub total_months: u32,
}

impl SummaryStats {
    /// Aggregate a non-empty projection series. Both baselines come from
    /// the series itself: `start_net_worth` is the first point's net worth
    /// and all growth figures are over the `total_months - 1` intervals
    /// between points.
    pub fn from_series(points: &[ProjectionPoint]) -> Option<Self> {
        let first = points.first()?;
        let last = points.last()?;
        let start_net_worth = first.net_worth;
        let end_net_worth = last.net_worth;
        let total_months = points.len() as u32;

        let start = start_net_worth.to_major_f64();
        let end = end_net_worth.to_major_f64();
        let valid = start > 0.0 && end > 0.0 && total_months > 1;
        let annualized_return = if valid {
            (end / start).powf(12.0 / total_months as f64) - 1.0
        } else {
            0.0
        };

        let mut growth_sum = 0.0;
        let mut growth_samples = 0u32;
        let mut previous = start;
        for point in &points[1..] {
            let current = point.net_worth.to_major_f64();
            if previous != 0.0 {
                growth_sum += (current - previous) / previous.abs();
                growth_samples += 1;
            }
            previous = current;
        }
        let avg_monthly_growth_rate = if growth_samples > 0 {
            growth_sum / growth_samples as f64
        } else {
            0.0
        };

        // start_net_worth and end_net_worth share the run currency, so the
        // subtraction cannot fail.
        let total_growth = end_net_worth
            .checked_sub(start_net_worth)
            .unwrap_or_else(|_| Money::zero(end_net_worth.currency()));

        Some(Self {
            start_net_worth,
            end_net_worth,
            total_growth,
            annualized_return,
            annualized_return_valid: valid,
            avg_monthly_growth_rate,
            total_months,
        })
    }
}

/// Everything one engine run produces.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub scenario_id: u32,
    pub scenario_name: String,
    pub projections: Vec<ProjectionPoint>,
    pub milestones: Vec<MilestoneResult>,
    pub summary: SummaryStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use approx::assert_relative_eq;

    fn zar() -> Currency {
        Currency::new("ZAR").unwrap()
    }

    fn point(year: i32, month: u32, net_worth_major: i64) -> ProjectionPoint {
        let zero = Money::zero(zar());
        ProjectionPoint {
            period: Period::new(year, month).unwrap(),
            net_worth: Money::from_major(net_worth_major, zar()),
            total_income: zero,
            total_expenses: zero,
            total_interest: zero,
            accounts: BTreeMap::new(),
        }
    }

    #[test]
    fn test_annualized_return_recovers_annual_rate() {
        // 1% monthly growth across the series, baselined on its first point
        let points: Vec<_> = (1..=12)
            .map(|m| {
                let balance = (100_000.0 * 1.01f64.powi(m as i32)).round() as i64;
                point(2026, m, balance)
            })
            .collect();

        let stats = SummaryStats::from_series(&points).unwrap();
        assert_eq!(stats.start_net_worth, points[0].net_worth);
        assert!(stats.annualized_return_valid);
        assert_relative_eq!(stats.annualized_return, 1.01f64.powi(11) - 1.0, epsilon = 1e-4);
        assert_relative_eq!(stats.avg_monthly_growth_rate, 0.01, epsilon = 1e-4);
        assert_eq!(stats.total_months, 12);
    }

    #[test]
    fn test_non_positive_start_invalidates_cagr() {
        let points = vec![point(2026, 1, 0), point(2026, 2, 10_000)];
        let stats = SummaryStats::from_series(&points).unwrap();

        assert!(!stats.annualized_return_valid);
        assert_eq!(stats.annualized_return, 0.0);
        assert_eq!(stats.total_growth, Money::from_major(10_000, zar()));
    }

    #[test]
    fn test_single_point_series_has_no_cagr() {
        let stats = SummaryStats::from_series(&[point(2026, 1, 10_000)]).unwrap();
        assert!(!stats.annualized_return_valid);
        assert_eq!(stats.avg_monthly_growth_rate, 0.0);
        assert!(stats.total_growth.is_zero());
    }

    #[test]
    fn test_empty_series_yields_no_stats() {
        assert!(SummaryStats::from_series(&[]).is_none());
    }

    #[test]
    fn test_growth_skips_zero_base_months() {
        // Zero -> 100 has no defined relative change; 100 -> 150 is +50%.
        let points = vec![point(2026, 1, 0), point(2026, 2, 100), point(2026, 3, 150)];
        let stats = SummaryStats::from_series(&points).unwrap();
        assert_relative_eq!(stats.avg_monthly_growth_rate, 0.5, epsilon = 1e-12);
    }
}
