//! Mutable account state for one simulation run
//!
//! The ledger owns a defensive copy of every account balance; the input
//! snapshot is never touched. Liability balances are held as positive owed
//! magnitudes, so posting rules branch on `is_liability`: a credit pays the
//! debt down (clamped at zero), a debit grows it. Per-account income,
//! expense and interest totals accumulate within a month and are drained
//! into the projection point by [`AccountLedger::flush_period`].

use crate::error::EngineError;
use crate::model::{Account, AccountId, Compounding};
use crate::money::{Currency, Money};
use crate::projection::output::AccountPoint;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Position {
    is_liability: bool,
    /// Owed magnitude for liabilities, signed balance otherwise.
    balance: Money,
    monthly_rate: f64,
    monthly_fee: Option<Money>,
    period_income: Money,
    period_expenses: Money,
    /// Signed net-worth effect: asset interest adds, liability interest
    /// subtracts.
    period_interest: Money,
}

/// Account balances and per-month accumulators for one run.
#[derive(Debug, Clone)]
pub struct AccountLedger {
    positions: BTreeMap<AccountId, Position>,
    currency: Currency,
}

impl AccountLedger {
    /// Copy the input accounts into ledger positions. Account ids must be
    /// unique and every balance must carry the scenario currency; the
    /// engine has already validated both, so failures here are defensive.
    pub fn new(accounts: &[Account], currency: Currency) -> Result<Self, EngineError> {
        let mut positions = BTreeMap::new();
        for account in accounts {
            let compounding = account.compounding.unwrap_or(Compounding::Monthly);
            let position = Position {
                is_liability: account.is_liability,
                balance: account.balance,
                monthly_rate: compounding.periodic_rate(account.annual_interest_rate),
                monthly_fee: account.monthly_fee,
                period_income: Money::zero(currency),
                period_expenses: Money::zero(currency),
                period_interest: Money::zero(currency),
            };
            if positions.insert(account.id, position).is_some() {
                return Err(EngineError::Validation(format!(
                    "duplicate account id {}",
                    account.id
                )));
            }
        }
        Ok(Self { positions, currency })
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Balance as a positive owed magnitude for liabilities, raw balance
    /// otherwise. Used by the settled end condition.
    pub fn balance_magnitude(&self, id: AccountId) -> Option<Money> {
        self.positions.get(&id).map(|p| p.balance)
    }

    /// Balance as its net-worth contribution: liabilities negated.
    pub fn signed_balance(&self, id: AccountId) -> Option<Money> {
        self.positions.get(&id).map(|p| {
            if p.is_liability {
                p.balance.negate()
            } else {
                p.balance
            }
        })
    }

    /// One month of interest/growth on every position. Liability interest
    /// grows the owed magnitude and counts against net worth.
    pub fn accrue_interest(&mut self) -> Result<(), EngineError> {
        for position in self.positions.values_mut() {
            let accrued = position.balance.mul_rate(position.monthly_rate);
            if accrued.is_zero() {
                continue;
            }
            position.balance = position.balance.checked_add(accrued)?;
            position.period_interest = if position.is_liability {
                position.period_interest.checked_sub(accrued)?
            } else {
                position.period_interest.checked_add(accrued)?
            };
        }
        Ok(())
    }

    /// Credit an income posting to its target account.
    pub fn post_income(&mut self, id: AccountId, amount: Money) -> Result<(), EngineError> {
        let position = self.position_mut(id)?;
        position.period_income = position.period_income.checked_add(amount)?;
        Self::credit(position, amount)
    }

    /// Debit an expense posting from its linked account.
    pub fn post_expense(&mut self, id: AccountId, amount: Money) -> Result<(), EngineError> {
        let position = self.position_mut(id)?;
        position.period_expenses = position.period_expenses.checked_add(amount)?;
        Self::debit(position, amount)
    }

    /// Move a contribution between two accounts. The source is debited in
    /// full even when the credit into a liability target clamps at zero;
    /// the overpaid remainder is not refunded.
    pub fn transfer(
        &mut self,
        source: AccountId,
        target: AccountId,
        amount: Money,
    ) -> Result<(), EngineError> {
        Self::debit(self.position_mut(source)?, amount)?;
        Self::credit(self.position_mut(target)?, amount)
    }

    /// Debit every account's monthly fee, counted as an expense.
    pub fn deduct_fees(&mut self) -> Result<(), EngineError> {
        for position in self.positions.values_mut() {
            if let Some(fee) = position.monthly_fee {
                position.period_expenses = position.period_expenses.checked_add(fee)?;
                Self::debit(position, fee)?;
            }
        }
        Ok(())
    }

    /// `Σ assets − Σ liabilities` over all positions.
    pub fn net_worth(&self) -> Result<Money, EngineError> {
        let mut total = Money::zero(self.currency);
        for position in self.positions.values() {
            total = if position.is_liability {
                total.checked_sub(position.balance)?
            } else {
                total.checked_add(position.balance)?
            };
        }
        Ok(total)
    }

    /// Snapshot every position into per-account point rows and reset the
    /// month accumulators.
    pub fn flush_period(&mut self) -> BTreeMap<AccountId, AccountPoint> {
        let zero = Money::zero(self.currency);
        self.positions
            .iter_mut()
            .map(|(&id, position)| {
                let row = AccountPoint {
                    balance: if position.is_liability {
                        position.balance.negate()
                    } else {
                        position.balance
                    },
                    income: position.period_income,
                    expenses: position.period_expenses,
                    interest: position.period_interest,
                };
                position.period_income = zero;
                position.period_expenses = zero;
                position.period_interest = zero;
                (id, row)
            })
            .collect()
    }

    fn position_mut(&mut self, id: AccountId) -> Result<&mut Position, EngineError> {
        self.positions
            .get_mut(&id)
            .ok_or_else(|| EngineError::Configuration(format!("unknown account id {}", id)))
    }

    fn credit(position: &mut Position, amount: Money) -> Result<(), EngineError> {
        if position.is_liability {
            let remaining = position.balance.checked_sub(amount)?;
            position.balance = if remaining.is_negative() {
                Money::zero(remaining.currency())
            } else {
                remaining
            };
        } else {
            position.balance = position.balance.checked_add(amount)?;
        }
        Ok(())
    }

    fn debit(position: &mut Position, amount: Money) -> Result<(), EngineError> {
        // Asset balances may go negative (overdraft); liability magnitudes
        // grow when drawn on.
        position.balance = if position.is_liability {
            position.balance.checked_add(amount)?
        } else {
            position.balance.checked_sub(amount)?
        };
        Ok(())
    }
}
