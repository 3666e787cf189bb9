//! Payment schedule simulation

mod params;
mod state;
mod period;
mod totals;
mod simulator;

pub use params::{CapitalOrigin, Periodicity, ScheduleParameters};
pub use state::SimulationState;
pub use period::{PeriodRecord, Schedule};
pub use totals::{ProjectionAggregator, ScheduleTotals};
pub use simulator::AmortizationSimulator;
