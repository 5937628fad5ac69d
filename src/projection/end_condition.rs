//! Flow deactivation rules
//!
//! Evaluated once per month after posting, for the month about to be
//! simulated. Because a flow fires in the month it crosses its threshold
//! and deactivation is applied before the next month's postings,
//! `until_amount` flows may overshoot their threshold on the final posting;
//! the overshoot is deliberately not clipped.

use crate::error::EngineError;
use crate::model::EndCondition;
use crate::money::Money;
use crate::period::Period;
use crate::projection::ledger::AccountLedger;
use std::cmp::Ordering;

/// Whether a flow remains active for `period` (the next month to be
/// simulated), given the cumulative amount it has posted so far.
pub fn is_active(
    condition: &EndCondition,
    cumulative_posted: Money,
    ledger: &AccountLedger,
    period: Period,
) -> Result<bool, EngineError> {
    match condition {
        EndCondition::None => Ok(true),
        EndCondition::UntilDate { date } => Ok(period <= Period::from_date(*date)),
        EndCondition::UntilAmount { threshold } => {
            Ok(cumulative_posted.checked_cmp(*threshold)? == Ordering::Less)
        }
        EndCondition::UntilAccountSettled { account_id } => {
            let balance = ledger.balance_magnitude(*account_id).ok_or_else(|| {
                EngineError::Configuration(format!(
                    "end condition references unknown account id {}",
                    account_id
                ))
            })?;
            Ok(!balance.is_zero())
        }
    }
}
