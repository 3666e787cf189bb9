//! In-memory store (tests and the CLI)

use chrono::Utc;
use std::collections::BTreeMap;

use crate::error::{ProjectionError, Result};
use crate::projection::{Projection, ProjectionDraft};
use super::{
    IncrementLedger, IncrementRecord, NewScheduleVersion, ProjectionRepository, ScheduleRepository,
    ScheduleVersion,
};

/// Projections, schedule versions and increments kept in maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    projections: BTreeMap<u64, Projection>,
    versions: BTreeMap<u64, ScheduleVersion>,
    increments: BTreeMap<(u64, u32), IncrementRecord>,
    next_projection_id: u64,
    next_version_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    pub fn increments(&self) -> impl Iterator<Item = &IncrementRecord> {
        self.increments.values()
    }

    fn set_active(&mut self, version_id: u64, active: bool) -> Result<()> {
        let version = self
            .versions
            .get_mut(&version_id)
            .ok_or_else(|| missing_version(version_id))?;
        version.active = active;
        Ok(())
    }
}

fn missing_version(version_id: u64) -> ProjectionError {
    ProjectionError::Storage(format!("schedule version {} does not exist", version_id))
}

impl ScheduleRepository for MemoryStore {
    fn load(&self, projection_id: u64) -> Result<Vec<ScheduleVersion>> {
        Ok(self
            .versions
            .values()
            .filter(|v| v.projection_id == projection_id)
            .cloned()
            .collect())
    }

    fn save(&mut self, version: NewScheduleVersion) -> Result<ScheduleVersion> {
        self.next_version_id += 1;
        let stored = ScheduleVersion {
            id: self.next_version_id,
            projection_id: version.projection_id,
            version: version.version,
            active: true,
            created_at: Utc::now(),
            derived_from: version.derived_from,
            periods: version.periods,
        };
        self.versions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn mark_inactive(&mut self, version_id: u64) -> Result<()> {
        self.set_active(version_id, false)
    }

    fn mark_active(&mut self, version_id: u64) -> Result<()> {
        self.set_active(version_id, true)
    }

    fn delete(&mut self, version_id: u64) -> Result<()> {
        self.versions
            .remove(&version_id)
            .map(|_| ())
            .ok_or_else(|| missing_version(version_id))
    }
}

impl ProjectionRepository for MemoryStore {
    fn get_projection(&self, projection_id: u64) -> Result<Option<Projection>> {
        Ok(self.projections.get(&projection_id).cloned())
    }

    fn insert_projection(&mut self, draft: ProjectionDraft) -> Result<Projection> {
        self.next_projection_id += 1;
        let id = self.next_projection_id;
        let projection = draft.into_projection(id, Utc::now());
        self.projections.insert(id, projection.clone());
        Ok(projection)
    }

    fn remove_projection(&mut self, projection_id: u64) -> Result<()> {
        self.projections
            .remove(&projection_id)
            .map(|_| ())
            .ok_or_else(|| ProjectionError::Storage(format!("projection {} does not exist", projection_id)))
    }
}

impl IncrementLedger for MemoryStore {
    fn increment_exists(&self, investment_id: u64, period: u32) -> Result<bool> {
        Ok(self.increments.contains_key(&(investment_id, period)))
    }

    fn record_increment(&mut self, record: IncrementRecord) -> Result<()> {
        let key = (record.investment_id, record.period);
        if self.increments.contains_key(&key) {
            return Err(ProjectionError::DuplicateIncrement {
                investment_id: record.investment_id,
                period: record.period,
            });
        }
        self.increments.insert(key, record);
        Ok(())
    }

    fn release_increment(&mut self, investment_id: u64, period: u32) -> Result<()> {
        self.increments
            .remove(&(investment_id, period))
            .map(|_| ())
            .ok_or_else(|| {
                ProjectionError::Storage(format!(
                    "no increment recorded for investment {} at period {}",
                    investment_id, period
                ))
            })
    }
}
