//! Read and write rules for schedule versions

use log::{debug, warn};

use crate::error::{ProjectionError, Result};
use super::{NewScheduleVersion, ScheduleRepository, ScheduleVersion};

/// Version semantics layered over any `ScheduleRepository`
pub trait ScheduleVersionStore: ScheduleRepository {
    /// The active version of a projection, else the one with the highest id
    fn active_or_latest(&self, projection_id: u64) -> Result<ScheduleVersion> {
        let versions = self.load(projection_id)?;

        let active = versions.iter().filter(|v| v.active).max_by_key(|v| v.id);
        let chosen = match active {
            Some(v) => Some(v),
            None => versions.iter().max_by_key(|v| v.id),
        };

        chosen
            .cloned()
            .ok_or(ProjectionError::MissingActiveSchedule { projection_id })
    }

    /// Retire the active versions of `projection_id` and insert `new_version` as active.
    ///
    /// The new version is written first. If a retirement then fails, the
    /// versions already retired are reactivated and the new one is deleted.
    fn supersede(&mut self, projection_id: u64, new_version: NewScheduleVersion) -> Result<ScheduleVersion> {
        let retiring: Vec<u64> = self
            .load(projection_id)?
            .into_iter()
            .filter(|v| v.active)
            .map(|v| v.id)
            .collect();
        let saved = self.save(new_version)?;

        for (done, &version_id) in retiring.iter().enumerate() {
            debug!("deactivating schedule version {} of projection {}", version_id, projection_id);
            if let Err(err) = self.mark_inactive(version_id) {
                for &retired in &retiring[..done] {
                    if let Err(undo) = self.mark_active(retired) {
                        warn!("could not reactivate schedule version {}: {}", retired, undo);
                    }
                }
                if let Err(undo) = self.delete(saved.id) {
                    warn!("could not delete schedule version {}: {}", saved.id, undo);
                }
                return Err(err);
            }
        }
        Ok(saved)
    }

    /// Insert a version derived from another without touching the source's flag
    fn insert_derived(&mut self, new_version: NewScheduleVersion) -> Result<ScheduleVersion> {
        self.save(new_version)
    }

    /// All versions of a projection ordered by version number
    fn history(&self, projection_id: u64) -> Result<Vec<ScheduleVersion>> {
        let mut versions = self.load(projection_id)?;
        versions.sort_by_key(|v| (v.version, v.id));
        Ok(versions)
    }
}

impl<T: ScheduleRepository + ?Sized> ScheduleVersionStore for T {}
