//! Goal-threshold detection over a projection series
//!
//! Finds the first month a goal's tracked balance (net worth by default,
//! or one named account) reaches its target. The `probability` figure is a
//! deliberate placeholder heuristic, not a statistical confidence: 1.0 when
//! the target is hit within the first third of the horizon, decaying
//! linearly to 0.5 at the horizon's end, 0.0 when never hit.

use crate::error::EngineError;
use crate::model::FinancialGoal;
use crate::money::{Currency, Money};
use crate::period::Period;
use crate::projection::ProjectionPoint;
use serde::Serialize;
use std::cmp::Ordering;

/// One goal checked against the projection.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneResult {
    pub name: String,
    pub target_amount: Money,
    pub achieved: bool,
    pub achieved_period: Option<Period>,
    /// Years from scenario start to the achieving month.
    pub years_away: Option<f64>,
    /// Whether the goal was reached by its target date, when one is set.
    pub on_schedule: Option<bool>,
    pub probability: f64,
}

/// The default net-worth ladder checked on every run.
pub fn standard_targets(currency: Currency) -> Vec<FinancialGoal> {
    [
        ("Net worth 100k", 100_000),
        ("Net worth 500k", 500_000),
        ("Net worth 1M", 1_000_000),
        ("Net worth 5M", 5_000_000),
        ("Net worth 10M", 10_000_000),
    ]
    .iter()
    .enumerate()
    .map(|(i, &(name, major))| FinancialGoal {
        name: name.to_string(),
        target_amount: Money::from_major(major, currency),
        current_amount: None,
        priority: i as u32 + 1,
        target_date: None,
        tracked_account_id: None,
    })
    .collect()
}

/// Check every goal against the series. `start` is the scenario's first
/// simulated month; `points` must be the full series from that month on.
pub fn detect(
    points: &[ProjectionPoint],
    goals: &[FinancialGoal],
    start: Period,
) -> Result<Vec<MilestoneResult>, EngineError> {
    goals
        .iter()
        .map(|goal| detect_one(points, goal, start))
        .collect()
}

fn detect_one(
    points: &[ProjectionPoint],
    goal: &FinancialGoal,
    start: Period,
) -> Result<MilestoneResult, EngineError> {
    let horizon = points.len() as f64;
    let mut achieved_at: Option<(usize, Period)> = None;

    for (index, point) in points.iter().enumerate() {
        let tracked = match goal.tracked_account_id {
            Some(id) => point.accounts.get(&id).map(|row| row.balance).ok_or_else(|| {
                EngineError::Configuration(format!(
                    "goal {:?} tracks unknown account id {}",
                    goal.name, id
                ))
            })?,
            None => point.net_worth,
        };
        if tracked.checked_cmp(goal.target_amount)? != Ordering::Less {
            achieved_at = Some((index, point.period));
            break;
        }
    }

    let (achieved_period, years_away, on_schedule, probability) = match achieved_at {
        Some((index, period)) => {
            let years = period.months_since(start) as f64 / 12.0;
            let on_schedule = goal
                .target_date
                .map(|date| period <= Period::from_date(date));
            (
                Some(period),
                Some(years),
                on_schedule,
                achievement_probability(index, horizon),
            )
        }
        None => (None, None, goal.target_date.map(|_| false), 0.0),
    };

    Ok(MilestoneResult {
        name: goal.name.clone(),
        target_amount: goal.target_amount,
        achieved: achieved_period.is_some(),
        achieved_period,
        years_away,
        on_schedule,
        probability,
    })
}

/// 1.0 within the first third of the horizon, then linear to 0.5 at the
/// final month.
fn achievement_probability(index: usize, horizon: f64) -> f64 {
    let position = (index + 1) as f64;
    let third = horizon / 3.0;
    if position <= third {
        return 1.0;
    }
    1.0 - 0.5 * (position - third) / (horizon - third)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

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

    fn goal(target_major: i64) -> FinancialGoal {
        FinancialGoal {
            name: "test goal".to_string(),
            target_amount: Money::from_major(target_major, zar()),
            current_amount: None,
            priority: 1,
            target_date: None,
            tracked_account_id: None,
        }
    }

    fn rising_series(months: u32) -> Vec<ProjectionPoint> {
        // 10,000 per month starting from 10,000
        (0..months)
            .map(|m| point(2026, m % 12 + 1, 10_000 * (m as i64 + 1)))
            .collect()
    }

    #[test]
    fn test_first_crossing_month_is_reported() {
        let points = rising_series(12);
        let start = Period::new(2026, 1).unwrap();
        let results = detect(&points, &[goal(50_000)], start).unwrap();

        let result = &results[0];
        assert!(result.achieved);
        // 50,000 is first reached in the fifth month
        assert_eq!(result.achieved_period, Some(Period::new(2026, 5).unwrap()));
        assert_relative_eq!(result.years_away.unwrap(), 4.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_probability_decay() {
        let points = rising_series(12);
        let start = Period::new(2026, 1).unwrap();

        // Hit in month 3 of 12: within the first third
        let early = &detect(&points, &[goal(30_000)], start).unwrap()[0];
        assert_relative_eq!(early.probability, 1.0, epsilon = 1e-12);

        // Hit in the final month: decays to 0.5
        let late = &detect(&points, &[goal(120_000)], start).unwrap()[0];
        assert_relative_eq!(late.probability, 0.5, epsilon = 1e-12);

        // Never hit
        let never = &detect(&points, &[goal(500_000)], start).unwrap()[0];
        assert!(!never.achieved);
        assert_eq!(never.probability, 0.0);
        assert!(never.years_away.is_none());
    }

    #[test]
    fn test_on_schedule_against_target_date() {
        let points = rising_series(12);
        let start = Period::new(2026, 1).unwrap();

        let mut timed = goal(50_000);
        timed.target_date = chrono::NaiveDate::from_ymd_opt(2026, 6, 30);
        let result = &detect(&points, &[timed], start).unwrap()[0];
        assert_eq!(result.on_schedule, Some(true));

        let mut tight = goal(100_000);
        tight.target_date = chrono::NaiveDate::from_ymd_opt(2026, 6, 30);
        let result = &detect(&points, &[tight], start).unwrap()[0];
        assert_eq!(result.on_schedule, Some(false));
    }

    #[test]
    fn test_standard_ladder() {
        let ladder = standard_targets(zar());
        assert_eq!(ladder.len(), 5);
        assert_eq!(ladder[0].target_amount, Money::from_major(100_000, zar()));
        assert_eq!(ladder[4].target_amount, Money::from_major(10_000_000, zar()));
    }

    #[test]
    fn test_tracked_account_goal() {
        let mut p = point(2026, 1, 0);
        p.accounts.insert(
            7,
            crate::projection::AccountPoint {
                balance: Money::from_major(80_000, zar()),
                income: Money::zero(zar()),
                expenses: Money::zero(zar()),
                interest: Money::zero(zar()),
            },
        );
        let start = Period::new(2026, 1).unwrap();

        let mut tracked = goal(50_000);
        tracked.tracked_account_id = Some(7);
        let result = &detect(&[p.clone()], &[tracked], start).unwrap()[0];
        assert!(result.achieved);

        let mut dangling = goal(50_000);
        dangling.tracked_account_id = Some(99);
        assert!(matches!(
            detect(&[p], &[dangling], start),
            Err(EngineError::Configuration(_))
        ));
    }
}
