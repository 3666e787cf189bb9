//! Investment Projection - amortization engine for investment-product schedules
//!
//! This library provides:
//! - Period-by-period payment schedule simulation (interest, costs, payouts)
//! - Increment splicing: grafting a capital top-up onto an existing schedule
//! - Schedule versioning with active / latest read semantics
//! - Projection records with aggregate totals kept in step with their schedule

pub mod error;
pub mod config;
pub mod schedule;
pub mod rates;
pub mod increment;
pub mod store;
pub mod projection;
pub mod batch;

// Re-export commonly used types
pub use error::{ProjectionError, Result};
pub use config::EngineConfig;
pub use schedule::{
    AmortizationSimulator, CapitalOrigin, PeriodRecord, Periodicity, ProjectionAggregator, Schedule,
    ScheduleParameters, ScheduleTotals,
};
pub use rates::{RateQuery, RateTier, RateTierResolver, RateTierTable};
pub use increment::{IncrementRequest, IncrementSplicer};
pub use store::{MemoryStore, ScheduleVersion, ScheduleVersionStore};
pub use projection::{NewProjection, Projection, ProjectionService};
pub use batch::BatchSimulator;
