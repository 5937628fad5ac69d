//! Cash-flow scheduling
//!
//! Decides whether a flow instance posts in a given simulation month, and
//! how many instances have posted so far. The simulation is month-grained:
//! weekly and biweekly flows post every month (the per-month multiplier on
//! the amount lives on [`Frequency`]), quarterly flows post in months
//! congruent to their start month modulo three, annual flows post in the
//! month matching their start date's month, and `once` flows post exactly
//! in the month containing their start date.

use crate::model::Frequency;
use crate::period::Period;
use chrono::NaiveDate;

/// Whether a flow posts in `period`.
///
/// `start_date` defaults to the simulation start when unset. A `once` flow
/// without a start date never posts here; run setup rejects such flows with
/// a configuration error before the loop starts. A `once` flow dated before
/// the simulation start never fires: the loop only visits months from the
/// start onward.
pub fn occurs_in(
    frequency: Frequency,
    start_date: Option<NaiveDate>,
    sim_start: Period,
    period: Period,
) -> bool {
    let start = match start_date {
        Some(date) => Period::from_date(date),
        None => sim_start,
    };

    match frequency {
        Frequency::Once => start_date.is_some() && period == start,
        Frequency::Weekly | Frequency::Biweekly | Frequency::Monthly => period >= start,
        Frequency::Quarterly => period >= start && period.month() % 3 == start.month() % 3,
        Frequency::Annually => period >= start && period.month() == start.month(),
    }
}

/// Cumulative number of postings in months up to and including `period`,
/// assuming the flow stays active throughout. Zero before the flow starts.
pub fn occurrence_index(
    frequency: Frequency,
    start_date: Option<NaiveDate>,
    sim_start: Period,
    period: Period,
) -> u32 {
    let start = match start_date {
        Some(date) => Period::from_date(date),
        None => sim_start,
    };
    if period < start {
        return 0;
    }
    let elapsed = period.months_since(start) as u32;

    match frequency {
        Frequency::Once => {
            if start_date.is_some() {
                1
            } else {
                0
            }
        }
        Frequency::Weekly | Frequency::Biweekly | Frequency::Monthly => elapsed + 1,
        Frequency::Quarterly => elapsed / 3 + 1,
        Frequency::Annually => elapsed / 12 + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    #[test]
    fn test_monthly_fires_every_month_from_start() {
        let sim_start = period(2026, 1);
        assert!(occurs_in(Frequency::Monthly, None, sim_start, period(2026, 1)));
        assert!(occurs_in(Frequency::Monthly, None, sim_start, period(2028, 7)));

        // Explicit later start delays the first posting
        let start = Some(date(2026, 4, 15));
        assert!(!occurs_in(Frequency::Monthly, start, sim_start, period(2026, 3)));
        assert!(occurs_in(Frequency::Monthly, start, sim_start, period(2026, 4)));
    }

    #[test]
    fn test_quarterly_alignment() {
        let sim_start = period(2026, 1);
        let start = Some(date(2026, 2, 1));
        assert!(occurs_in(Frequency::Quarterly, start, sim_start, period(2026, 2)));
        assert!(!occurs_in(Frequency::Quarterly, start, sim_start, period(2026, 3)));
        assert!(!occurs_in(Frequency::Quarterly, start, sim_start, period(2026, 4)));
        assert!(occurs_in(Frequency::Quarterly, start, sim_start, period(2026, 5)));
        assert!(occurs_in(Frequency::Quarterly, start, sim_start, period(2026, 8)));
    }

    #[test]
    fn test_annual_fires_in_start_month() {
        let sim_start = period(2026, 1);
        let start = Some(date(2026, 6, 30));
        assert!(occurs_in(Frequency::Annually, start, sim_start, period(2026, 6)));
        assert!(!occurs_in(Frequency::Annually, start, sim_start, period(2026, 7)));
        assert!(occurs_in(Frequency::Annually, start, sim_start, period(2027, 6)));
    }

    #[test]
    fn test_once_fires_exactly_in_its_month() {
        let sim_start = period(2026, 1);
        let start = Some(date(2026, 3, 10));
        assert!(!occurs_in(Frequency::Once, start, sim_start, period(2026, 2)));
        assert!(occurs_in(Frequency::Once, start, sim_start, period(2026, 3)));
        assert!(!occurs_in(Frequency::Once, start, sim_start, period(2026, 4)));
    }

    #[test]
    fn test_once_in_the_past_never_fires() {
        // The loop only visits months >= sim_start, so a past-dated once
        // flow has no month equal to its start period.
        let sim_start = period(2026, 1);
        let start = Some(date(2025, 12, 1));
        for m in 1..=12 {
            assert!(!occurs_in(Frequency::Once, start, sim_start, period(2026, m)));
        }
    }

    #[test]
    fn test_once_without_date_never_fires() {
        let sim_start = period(2026, 1);
        assert!(!occurs_in(Frequency::Once, None, sim_start, period(2026, 1)));
    }

    #[test]
    fn test_occurrence_index_monthly() {
        let sim_start = period(2026, 1);
        assert_eq!(occurrence_index(Frequency::Monthly, None, sim_start, period(2026, 1)), 1);
        assert_eq!(occurrence_index(Frequency::Monthly, None, sim_start, period(2026, 12)), 12);
        let start = Some(date(2026, 6, 1));
        assert_eq!(occurrence_index(Frequency::Monthly, start, sim_start, period(2026, 5)), 0);
        assert_eq!(occurrence_index(Frequency::Monthly, start, sim_start, period(2026, 8)), 3);
    }

    #[test]
    fn test_occurrence_index_quarterly_and_annual() {
        let sim_start = period(2026, 1);
        assert_eq!(occurrence_index(Frequency::Quarterly, None, sim_start, period(2026, 1)), 1);
        assert_eq!(occurrence_index(Frequency::Quarterly, None, sim_start, period(2026, 4)), 2);
        assert_eq!(occurrence_index(Frequency::Quarterly, None, sim_start, period(2026, 12)), 4);
        assert_eq!(occurrence_index(Frequency::Annually, None, sim_start, period(2026, 12)), 1);
        assert_eq!(occurrence_index(Frequency::Annually, None, sim_start, period(2027, 1)), 2);
    }
}
