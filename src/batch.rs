//! Batch simulation across independent parameter sets
//!
//! Schedules share no state, so batches are simulated in parallel.

use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::schedule::{AmortizationSimulator, Schedule, ScheduleParameters};

/// Runs many simulations with one configuration
///
/// # Example
/// ```ignore
/// let runner = BatchSimulator::default();
/// let quotes = runner.run_rates(&params, &[dec!(0.9), dec!(1.0), dec!(1.1)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchSimulator {
    simulator: AmortizationSimulator,
}

impl BatchSimulator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            simulator: AmortizationSimulator::new(config),
        }
    }

    /// Simulate every parameter set; results keep the input order
    pub fn run_batch(&self, params: &[ScheduleParameters]) -> Vec<Result<Schedule>> {
        params.par_iter().map(|p| self.simulator.simulate(p)).collect()
    }

    /// Simulate one parameter set at several candidate rates
    pub fn run_rates(&self, base: &ScheduleParameters, rates: &[Decimal]) -> Vec<Result<Schedule>> {
        rates
            .par_iter()
            .map(|&rate| {
                let params = ScheduleParameters { rate, ..base.clone() };
                self.simulator.simulate(&params)
            })
            .collect()
    }
}
