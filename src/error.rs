//! Error taxonomy for scenario validation and simulation

use crate::money::MoneyError;
use thiserror::Error;

/// Errors surfaced by the projection engine.
///
/// No error is retried internally: the engine is deterministic and stateless
/// across calls, so a retry without input changes reproduces the same error.
/// A run either produces the full projection series or none of it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad input shape: inverted date ranges, negative amounts,
    /// malformed bracket tables. Rejected before any simulation step runs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Dangling account/tax-profile references or a `once` flow without a
    /// date. Rejected at run setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Multi-currency arithmetic attempted at the money layer.
    #[error(transparent)]
    CurrencyMismatch(#[from] MoneyError),
}
