//! Parallel execution of independent scenario batches
//!
//! Each scenario is a self-contained, defensive engine run, so a batch
//! parallelizes trivially. Results come back in input order; the first
//! failing scenario fails the whole batch.

use crate::error::EngineError;
use crate::model::ScenarioInput;
use crate::projection::{ProjectionEngine, SimulationOutcome};
use log::info;
use rayon::prelude::*;
use std::collections::HashSet;

pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Run every scenario of the batch. Scenario ids must be unique within
    /// one batch, so no two concurrent runs share an id.
    pub fn run_batch(inputs: &[ScenarioInput]) -> Result<Vec<SimulationOutcome>, EngineError> {
        let mut seen = HashSet::new();
        for input in inputs {
            if !seen.insert(input.scenario.id) {
                return Err(EngineError::Validation(format!(
                    "duplicate scenario id {} in batch",
                    input.scenario.id
                )));
            }
        }

        info!("running batch of {} scenarios", inputs.len());
        inputs.par_iter().map(ProjectionEngine::run).collect()
    }
}
