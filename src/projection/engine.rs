//! Scenario validation and the month-by-month simulation loop
//!
//! `ProjectionEngine::run` is the single library entry point: validate the
//! input snapshot, then walk every month of the horizon applying the fixed
//! posting order (interest, income, expenses, investment transfers, fees,
//! end conditions, snapshot). The input is never mutated; all run state
//! lives on [`SimulationRun`], so two runs over the same input produce
//! identical series.

use crate::error::EngineError;
use crate::milestones;
use crate::model::{
    EndCondition, Frequency, IncomeSource, ScenarioInput, TaxBracket, TaxProfile, TaxProfileId,
};
use crate::money::{Currency, Money};
use crate::period::Period;
use crate::projection::end_condition::is_active;
use crate::projection::ledger::AccountLedger;
use crate::projection::output::{ProjectionPoint, SimulationOutcome, SummaryStats};
use crate::schedule::occurs_in;
use crate::tax;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Stateless front door; all per-run state lives on [`SimulationRun`].
pub struct ProjectionEngine;

impl ProjectionEngine {
    /// Validate `input` and simulate the full horizon. Either the complete
    /// outcome is returned or the first error; no partial series escapes.
    pub fn run(input: &ScenarioInput) -> Result<SimulationOutcome, EngineError> {
        SimulationRun::initialize(input)?.execute()
    }
}

/// Cumulative posting and activation state for one recurring flow, owned
/// by the run rather than the shared configuration.
struct FlowState {
    active: bool,
    posted: Money,
}

/// One validated, ready-to-execute simulation.
pub struct SimulationRun<'a> {
    input: &'a ScenarioInput,
    currency: Currency,
    start: Period,
    end: Period,
    ledger: AccountLedger,
    tax_profiles: HashMap<TaxProfileId, &'a TaxProfile>,
    expense_states: Vec<FlowState>,
    investment_states: Vec<FlowState>,
}

impl<'a> SimulationRun<'a> {
    /// Check the whole snapshot before any simulation step runs: date
    /// range, single currency, non-negative amounts, unique ids, resolvable
    /// account and tax-profile references, dated `once` flows, well-formed
    /// bracket tables.
    pub fn initialize(input: &'a ScenarioInput) -> Result<Self, EngineError> {
        let scenario = &input.scenario;
        if scenario.end_date <= scenario.start_date {
            return Err(EngineError::Validation(format!(
                "scenario {:?}: end date {} is not after start date {}",
                scenario.name, scenario.end_date, scenario.start_date
            )));
        }

        let first = input.accounts.first().ok_or_else(|| {
            EngineError::Validation(format!("scenario {:?} has no accounts", scenario.name))
        })?;
        let currency = first.currency;

        for account in &input.accounts {
            if account.currency != currency {
                return Err(EngineError::Validation(format!(
                    "account {:?} uses {} but the scenario runs in {}",
                    account.name, account.currency, currency
                )));
            }
            ensure_currency(account.balance, currency, "account balance")?;
            if let Some(fee) = account.monthly_fee {
                ensure_currency(fee, currency, "monthly fee")?;
                if fee.is_negative() {
                    return Err(EngineError::Validation(format!(
                        "account {:?} has a negative monthly fee",
                        account.name
                    )));
                }
            }
            if account.is_liability && account.balance.is_negative() {
                return Err(EngineError::Validation(format!(
                    "liability {:?} has a negative owed amount; owed amounts are magnitudes",
                    account.name
                )));
            }
        }

        let ledger = AccountLedger::new(&input.accounts, currency)?;

        let mut tax_profiles = HashMap::new();
        for profile in &input.tax_profiles {
            validate_brackets(profile, currency)?;
            if tax_profiles.insert(profile.id, profile).is_some() {
                return Err(EngineError::Validation(format!(
                    "duplicate tax profile id {}",
                    profile.id
                )));
            }
        }

        let mut seen_incomes = HashSet::new();
        for income in &input.income_sources {
            if !seen_incomes.insert(income.id) {
                return Err(EngineError::Validation(format!(
                    "duplicate income source id {}",
                    income.id
                )));
            }
            ensure_currency(income.base_amount, currency, "income amount")?;
            ensure_non_negative(income.base_amount, &income.name)?;
            ensure_dated_once(income.frequency, income.start_date, &income.name)?;
            ensure_account(&ledger, income.target_account_id, &income.name)?;
            if let Some(profile_id) = income.tax_profile_id {
                if !tax_profiles.contains_key(&profile_id) {
                    return Err(EngineError::Configuration(format!(
                        "income {:?} references unknown tax profile id {}",
                        income.name, profile_id
                    )));
                }
            }
        }

        let mut seen_expenses = HashSet::new();
        for expense in &input.expenses {
            if !seen_expenses.insert(expense.id) {
                return Err(EngineError::Validation(format!(
                    "duplicate expense id {}",
                    expense.id
                )));
            }
            ensure_currency(expense.amount_value, currency, "expense amount")?;
            ensure_non_negative(expense.amount_value, &expense.name)?;
            ensure_dated_once(expense.frequency, expense.start_date, &expense.name)?;
            ensure_account(&ledger, expense.linked_account_id, &expense.name)?;
            ensure_end_condition(&ledger, &expense.end_condition, currency, &expense.name)?;
        }

        let mut seen_investments = HashSet::new();
        for investment in &input.investments {
            if !seen_investments.insert(investment.id) {
                return Err(EngineError::Validation(format!(
                    "duplicate investment id {}",
                    investment.id
                )));
            }
            ensure_currency(investment.amount, currency, "investment amount")?;
            ensure_non_negative(investment.amount, &investment.name)?;
            ensure_dated_once(investment.frequency, investment.start_date, &investment.name)?;
            ensure_account(&ledger, investment.source_account_id, &investment.name)?;
            ensure_account(&ledger, investment.target_account_id, &investment.name)?;
            ensure_end_condition(&ledger, &investment.end_condition, currency, &investment.name)?;
        }

        for goal in &input.goals {
            ensure_currency(goal.target_amount, currency, "goal target")?;
            if let Some(id) = goal.tracked_account_id {
                ensure_account(&ledger, id, &goal.name)?;
            }
        }

        let zero = Money::zero(currency);
        let expense_states = input
            .expenses
            .iter()
            .map(|_| FlowState { active: true, posted: zero })
            .collect();
        let investment_states = input
            .investments
            .iter()
            .map(|_| FlowState { active: true, posted: zero })
            .collect();

        Ok(Self {
            input,
            currency,
            start: Period::from_date(scenario.start_date),
            end: Period::from_date(scenario.end_date),
            ledger,
            tax_profiles,
            expense_states,
            investment_states,
        })
    }

    /// Simulate every month from start to end inclusive.
    pub fn execute(mut self) -> Result<SimulationOutcome, EngineError> {
        let input = self.input;
        let start = self.start;
        let inflation = input.assumptions.inflation_rate;
        let total_months = (self.end.months_since(start) + 1) as usize;

        info!(
            "projecting scenario {:?}: {} months from {}, {} accounts",
            input.scenario.name,
            total_months,
            start,
            input.accounts.len()
        );

        let mut points = Vec::with_capacity(total_months);
        let mut period = start;
        loop {
            self.ledger.accrue_interest()?;

            // Elapsed time in fractional years, so annual increase and
            // inflation scaling compound a little every month instead of
            // stepping at anniversaries.
            let years = period.months_since(start) as f64 / 12.0;
            for income in &input.income_sources {
                if !occurs_in(income.frequency, income.start_date, start, period) {
                    continue;
                }
                let posting = self.income_posting(income, years)?;
                self.ledger.post_income(income.target_account_id, posting)?;
            }

            for (expense, state) in input.expenses.iter().zip(self.expense_states.iter_mut()) {
                if !state.active
                    || !occurs_in(expense.frequency, expense.start_date, start, period)
                {
                    continue;
                }
                let mut amount = expense.amount_value;
                if expense.inflation_adjusted {
                    amount = amount.mul_rate((1.0 + inflation).powf(years));
                }
                let posting = amount.mul_rate(expense.frequency.monthly_multiplier());
                self.ledger.post_expense(expense.linked_account_id, posting)?;
                state.posted = state.posted.checked_add(posting)?;
            }

            for (investment, state) in
                input.investments.iter().zip(self.investment_states.iter_mut())
            {
                if !state.active
                    || !occurs_in(investment.frequency, investment.start_date, start, period)
                {
                    continue;
                }
                let scaled = investment
                    .amount
                    .mul_rate((1.0 + investment.annual_increase_rate).powf(years));
                let posting = scaled.mul_rate(investment.frequency.monthly_multiplier());
                self.ledger.transfer(
                    investment.source_account_id,
                    investment.target_account_id,
                    posting,
                )?;
                state.posted = state.posted.checked_add(posting)?;
            }

            self.ledger.deduct_fees()?;

            // Deactivation is decided for the next month, so a flow still
            // fires in the month it crosses its threshold. Only active
            // flows are re-evaluated, which keeps deactivation monotonic.
            let next = period.next();
            for (expense, state) in input.expenses.iter().zip(self.expense_states.iter_mut()) {
                if state.active {
                    state.active =
                        is_active(&expense.end_condition, state.posted, &self.ledger, next)?;
                    if !state.active {
                        debug!("expense {:?} deactivated after {}", expense.name, period);
                    }
                }
            }
            for (investment, state) in
                input.investments.iter().zip(self.investment_states.iter_mut())
            {
                if state.active {
                    state.active =
                        is_active(&investment.end_condition, state.posted, &self.ledger, next)?;
                    if !state.active {
                        debug!("investment {:?} deactivated after {}", investment.name, period);
                    }
                }
            }

            let accounts = self.ledger.flush_period();
            let mut total_income = Money::zero(self.currency);
            let mut total_expenses = Money::zero(self.currency);
            let mut total_interest = Money::zero(self.currency);
            for row in accounts.values() {
                total_income = total_income.checked_add(row.income)?;
                total_expenses = total_expenses.checked_add(row.expenses)?;
                total_interest = total_interest.checked_add(row.interest)?;
            }
            points.push(ProjectionPoint {
                period,
                net_worth: self.ledger.net_worth()?,
                total_income,
                total_expenses,
                total_interest,
                accounts,
            });

            if period == self.end {
                break;
            }
            period = next;
        }

        let mut goals = milestones::standard_targets(self.currency);
        goals.extend(input.goals.iter().cloned());
        let milestones = milestones::detect(&points, &goals, start)?;

        let summary = SummaryStats::from_series(&points).ok_or_else(|| {
            EngineError::Validation(format!(
                "scenario {:?} produced an empty projection",
                input.scenario.name
            ))
        })?;
        info!(
            "scenario {:?} complete: net worth {} -> {}",
            input.scenario.name, summary.start_net_worth, summary.end_net_worth
        );

        Ok(SimulationOutcome {
            scenario_id: input.scenario.id,
            scenario_name: input.scenario.name.clone(),
            projections: points,
            milestones,
            summary,
        })
    }

    /// The net monthly posting of one income source, `years` fractional
    /// years into the run. Withholding applies only to pre-tax income with
    /// an attached profile: the per-payment amount is annualized for
    /// bracket lookup, then the annual withholding is spread back over the
    /// year's payments.
    fn income_posting(&self, income: &IncomeSource, years: f64) -> Result<Money, EngineError> {
        let scaled = income
            .base_amount
            .mul_rate((1.0 + income.annual_increase_rate).powf(years));

        let per_payment = match income.tax_profile_id {
            Some(profile_id) if income.is_pre_tax => {
                // Reference checked at initialize.
                let profile = self.tax_profiles.get(&profile_id).ok_or_else(|| {
                    EngineError::Configuration(format!(
                        "unknown tax profile id {}",
                        profile_id
                    ))
                })?;
                let annualized = income.frequency.annualized_multiplier();
                let annual_gross = scaled.mul_rate(annualized);
                let withheld = tax::annual_withholding(annual_gross, profile)?.total()?;
                scaled.checked_sub(withheld.mul_rate(1.0 / annualized))?
            }
            _ => scaled,
        };

        Ok(per_payment.mul_rate(income.frequency.monthly_multiplier()))
    }
}

fn ensure_currency(amount: Money, currency: Currency, what: &str) -> Result<(), EngineError> {
    if amount.currency() != currency {
        return Err(EngineError::Validation(format!(
            "{} uses {} but the scenario runs in {}",
            what,
            amount.currency(),
            currency
        )));
    }
    Ok(())
}

fn ensure_non_negative(amount: Money, name: &str) -> Result<(), EngineError> {
    if amount.is_negative() {
        return Err(EngineError::Validation(format!(
            "flow {:?} has a negative amount",
            name
        )));
    }
    Ok(())
}

fn ensure_dated_once(
    frequency: Frequency,
    start_date: Option<chrono::NaiveDate>,
    name: &str,
) -> Result<(), EngineError> {
    if frequency == Frequency::Once && start_date.is_none() {
        return Err(EngineError::Configuration(format!(
            "one-time flow {:?} has no start date",
            name
        )));
    }
    Ok(())
}

fn ensure_account(ledger: &AccountLedger, id: u32, name: &str) -> Result<(), EngineError> {
    if !ledger.contains(id) {
        return Err(EngineError::Configuration(format!(
            "{:?} references unknown account id {}",
            name, id
        )));
    }
    Ok(())
}

fn ensure_end_condition(
    ledger: &AccountLedger,
    condition: &EndCondition,
    currency: Currency,
    name: &str,
) -> Result<(), EngineError> {
    match condition {
        EndCondition::UntilAmount { threshold } => {
            ensure_currency(*threshold, currency, "end condition threshold")?;
            if !threshold.is_positive() {
                return Err(EngineError::Validation(format!(
                    "flow {:?} has a non-positive until-amount threshold",
                    name
                )));
            }
        }
        EndCondition::UntilAccountSettled { account_id } => {
            ensure_account(ledger, *account_id, name)?;
        }
        EndCondition::None | EndCondition::UntilDate { .. } => {}
    }
    Ok(())
}

/// Bracket tables must partition `[0, inf)`: the first minimum is zero,
/// each maximum equals the next bracket's minimum, and only the final
/// bracket is open-ended, so exactly one bracket contains any gross amount.
fn validate_brackets(profile: &TaxProfile, currency: Currency) -> Result<(), EngineError> {
    if profile.brackets.is_empty() {
        return Err(EngineError::Validation(format!(
            "tax profile {:?} has no brackets",
            profile.name
        )));
    }
    let mut previous: Option<&TaxBracket> = None;
    for bracket in &profile.brackets {
        ensure_currency(bracket.min, currency, "bracket minimum")?;
        ensure_currency(bracket.base_tax, currency, "bracket base tax")?;
        if !(0.0..=1.0).contains(&bracket.rate) {
            return Err(EngineError::Validation(format!(
                "tax profile {:?} has a rate outside [0, 1]",
                profile.name
            )));
        }
        if let Some(max) = bracket.max {
            ensure_currency(max, currency, "bracket maximum")?;
            if max <= bracket.min {
                return Err(EngineError::Validation(format!(
                    "tax profile {:?}: bracket maximum must exceed its minimum",
                    profile.name
                )));
            }
        }
        match previous {
            None => {
                if !bracket.min.is_zero() {
                    return Err(EngineError::Validation(format!(
                        "tax profile {:?}: first bracket must start at zero",
                        profile.name
                    )));
                }
            }
            Some(prev) => match prev.max {
                Some(prev_max) if prev_max == bracket.min => {}
                Some(_) => {
                    return Err(EngineError::Validation(format!(
                        "tax profile {:?}: bracket maximums must equal the next minimum",
                        profile.name
                    )));
                }
                None => {
                    return Err(EngineError::Validation(format!(
                        "tax profile {:?}: only the final bracket may be open-ended",
                        profile.name
                    )));
                }
            },
        }
        previous = Some(bracket);
    }
    Ok(())
}
