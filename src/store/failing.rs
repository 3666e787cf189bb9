//! Test store that fails one chosen write, then behaves like `MemoryStore`

use crate::error::{ProjectionError, Result};
use crate::projection::{Projection, ProjectionDraft};
use super::{
    IncrementLedger, IncrementRecord, MemoryStore, NewScheduleVersion, ProjectionRepository, ScheduleRepository,
    ScheduleVersion,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Save,
    MarkInactive(u64),
    InsertProjection,
    RecordIncrement,
}

#[derive(Debug, Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    armed: Option<Write>,
}

impl FailingStore {
    /// Fail the next matching write once
    pub fn fail_on(&mut self, write: Write) {
        self.armed = Some(write);
    }

    fn trip(&mut self, write: Write) -> Result<()> {
        if self.armed == Some(write) {
            self.armed = None;
            return Err(ProjectionError::Storage(format!("injected failure on {:?}", write)));
        }
        Ok(())
    }
}

impl ScheduleRepository for FailingStore {
    fn load(&self, projection_id: u64) -> Result<Vec<ScheduleVersion>> {
        self.inner.load(projection_id)
    }

    fn save(&mut self, version: NewScheduleVersion) -> Result<ScheduleVersion> {
        self.trip(Write::Save)?;
        self.inner.save(version)
    }

    fn mark_inactive(&mut self, version_id: u64) -> Result<()> {
        self.trip(Write::MarkInactive(version_id))?;
        self.inner.mark_inactive(version_id)
    }

    fn mark_active(&mut self, version_id: u64) -> Result<()> {
        self.inner.mark_active(version_id)
    }

    fn delete(&mut self, version_id: u64) -> Result<()> {
        self.inner.delete(version_id)
    }
}

impl ProjectionRepository for FailingStore {
    fn get_projection(&self, projection_id: u64) -> Result<Option<Projection>> {
        self.inner.get_projection(projection_id)
    }

    fn insert_projection(&mut self, draft: ProjectionDraft) -> Result<Projection> {
        self.trip(Write::InsertProjection)?;
        self.inner.insert_projection(draft)
    }

    fn remove_projection(&mut self, projection_id: u64) -> Result<()> {
        self.inner.remove_projection(projection_id)
    }
}

impl IncrementLedger for FailingStore {
    fn increment_exists(&self, investment_id: u64, period: u32) -> Result<bool> {
        self.inner.increment_exists(investment_id, period)
    }

    fn record_increment(&mut self, record: IncrementRecord) -> Result<()> {
        self.trip(Write::RecordIncrement)?;
        self.inner.record_increment(record)
    }

    fn release_increment(&mut self, investment_id: u64, period: u32) -> Result<()> {
        self.inner.release_increment(investment_id, period)
    }
}
