//! Input snapshot types for one scenario simulation
//!
//! These objects are created and edited by the owning service's CRUD layer
//! and arrive here as already-validated, immutable snapshots. The engine
//! never mutates them; it operates on defensive copies of balances and
//! per-flow counters, so the same configuration simulates repeatedly with
//! identical results.

mod accounts;
mod flows;
mod goals;
mod scenario;
mod tax;

pub use accounts::{Account, AccountId, Compounding};
pub use flows::{
    EndCondition, ExpenseDefinition, FlowId, Frequency, IncomeSource, InvestmentContribution,
};
pub use goals::FinancialGoal;
pub use scenario::{Assumptions, Scenario, ScenarioInput};
pub use tax::{TaxBracket, TaxProfile, TaxProfileId, TaxRebates};
