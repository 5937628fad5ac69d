//! FinSim - Deterministic month-by-month projection engine for personal financial scenarios
//!
//! This library provides:
//! - Fixed-point money arithmetic (no floating-point balances)
//! - Scheduled income, expense and investment flows with end conditions
//! - PAYE-style bracket tax and UIF withholding
//! - Compound-interest account ledger and net-worth projection
//! - Goal/milestone detection and multi-scenario batch runs

pub mod error;
pub mod milestones;
pub mod model;
pub mod money;
pub mod period;
pub mod projection;
pub mod runner;
pub mod schedule;
pub mod tax;

// Re-export commonly used types
pub use error::EngineError;
pub use model::{Account, ScenarioInput, TaxProfile};
pub use money::{Currency, Money};
pub use period::Period;
pub use projection::{ProjectionEngine, ProjectionPoint, SimulationOutcome, SummaryStats};
pub use runner::ScenarioRunner;
