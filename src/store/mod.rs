//! Persistence seams for projections and schedule versions
//!
//! Storage technology is not this crate's concern. The engine talks to three
//! narrow traits; `MemoryStore` implements all of them for tests and the CLI.
//! Active-flag transitions go through `ScheduleVersionStore` only.
//!
//! There are no transactions at this seam. Multi-step operations undo their
//! earlier writes through the compensating methods (`delete`,
//! `remove_projection`, `release_increment`) when a later write fails.

mod versions;
mod memory;
#[cfg(test)]
pub(crate) mod failing;

pub use versions::ScheduleVersionStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::projection::{Projection, ProjectionDraft};
use crate::schedule::{PeriodRecord, Schedule};

/// A stored, immutable schedule belonging to one projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleVersion {
    pub id: u64,
    pub projection_id: u64,
    pub version: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// Source version, set only for spliced schedules
    pub derived_from: Option<u64>,
    pub periods: Vec<PeriodRecord>,
}

impl ScheduleVersion {
    /// Rebuild the schedule (periods plus totals) from the stored periods
    pub fn schedule(&self) -> Schedule {
        Schedule::from_periods(self.periods.clone())
    }
}

/// A schedule version before the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduleVersion {
    pub projection_id: u64,
    pub version: u32,
    pub derived_from: Option<u64>,
    pub periods: Vec<PeriodRecord>,
}

/// An accepted capital increment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementRecord {
    pub investment_id: u64,
    pub period: u32,
    pub amount: Decimal,
    /// Projection the increment was applied to
    pub source_projection_id: u64,
}

/// Storage for schedule versions
pub trait ScheduleRepository {
    /// All versions of a projection, in any order
    fn load(&self, projection_id: u64) -> Result<Vec<ScheduleVersion>>;

    /// Insert a version as active; the store assigns id and timestamp
    fn save(&mut self, version: NewScheduleVersion) -> Result<ScheduleVersion>;

    fn mark_inactive(&mut self, version_id: u64) -> Result<()>;

    /// Undo `mark_inactive` for a supersede that could not complete
    fn mark_active(&mut self, version_id: u64) -> Result<()>;

    /// Remove a version written by an operation that then failed
    fn delete(&mut self, version_id: u64) -> Result<()>;
}

/// Storage for projection records
pub trait ProjectionRepository {
    fn get_projection(&self, projection_id: u64) -> Result<Option<Projection>>;

    /// Insert a projection; a draft without an investment id starts a new lineage
    fn insert_projection(&mut self, draft: ProjectionDraft) -> Result<Projection>;

    /// Remove a projection inserted by an operation that then failed
    fn remove_projection(&mut self, projection_id: u64) -> Result<()>;
}

/// Record of increments keyed by (investment, period)
pub trait IncrementLedger {
    fn increment_exists(&self, investment_id: u64, period: u32) -> Result<bool>;

    /// Claim the (investment, period) slot.
    ///
    /// Must fail with `DuplicateIncrement` if the slot is taken, atomically
    /// with the check, so two racing increments cannot both succeed.
    fn record_increment(&mut self, record: IncrementRecord) -> Result<()>;

    /// Free a slot whose increment was never persisted
    fn release_increment(&mut self, investment_id: u64, period: u32) -> Result<()>;
}
