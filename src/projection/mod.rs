//! Month-by-month scenario projection

mod end_condition;
mod engine;
mod ledger;
mod output;

pub use end_condition::is_active;
pub use engine::{ProjectionEngine, SimulationRun};
pub use ledger::AccountLedger;
pub use output::{AccountPoint, ProjectionPoint, SimulationOutcome, SummaryStats};
