//! Projection records and the operations that create them

mod service;

pub use service::ProjectionService;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::schedule::{CapitalOrigin, Periodicity, ScheduleParameters, ScheduleTotals};

/// A priced investment configuration with its summary totals.
///
/// Never edited in place: updates and increments produce a new record,
/// leaving this one as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub id: u64,
    /// Root projection of this lineage
    pub investment_id: u64,
    /// Projection this one replaced or was incremented from
    pub derived_from: Option<u64>,
    pub product_id: u32,
    pub term: u32,
    pub rate_tier_id: u32,
    pub rate: Decimal,
    pub capital: Decimal,
    pub origin: CapitalOrigin,
    pub periodicity: Periodicity,
    pub start_date: NaiveDate,
    pub extra_contribution: Decimal,
    pub operating_cost: Decimal,
    pub notarization_cost: Decimal,
    pub totals: ScheduleTotals,
    pub created_at: DateTime<Utc>,
}

impl Projection {
    /// Simulation inputs built from this projection's recorded terms.
    ///
    /// These reproduce the schedule of a created or updated projection. An
    /// incremented projection's stored schedule is spliced, so simulating
    /// these inputs from scratch gives a different schedule.
    pub fn schedule_parameters(&self) -> ScheduleParameters {
        ScheduleParameters {
            capital: self.capital,
            start_date: self.start_date,
            term: self.term,
            rate: self.rate,
            extra_contribution: self.extra_contribution,
            operating_cost: self.operating_cost,
            notarization_cost: self.notarization_cost,
            origin: self.origin,
            periodicity: self.periodicity,
        }
    }
}

/// A projection before the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDraft {
    /// `None` starts a new lineage rooted at the inserted record
    pub investment_id: Option<u64>,
    pub derived_from: Option<u64>,
    pub product_id: u32,
    pub term: u32,
    pub rate_tier_id: u32,
    pub rate: Decimal,
    pub capital: Decimal,
    pub origin: CapitalOrigin,
    pub periodicity: Periodicity,
    pub start_date: NaiveDate,
    pub extra_contribution: Decimal,
    pub operating_cost: Decimal,
    pub notarization_cost: Decimal,
    pub totals: ScheduleTotals,
}

impl ProjectionDraft {
    pub fn into_projection(self, id: u64, created_at: DateTime<Utc>) -> Projection {
        Projection {
            id,
            investment_id: self.investment_id.unwrap_or(id),
            derived_from: self.derived_from,
            product_id: self.product_id,
            term: self.term,
            rate_tier_id: self.rate_tier_id,
            rate: self.rate,
            capital: self.capital,
            origin: self.origin,
            periodicity: self.periodicity,
            start_date: self.start_date,
            extra_contribution: self.extra_contribution,
            operating_cost: self.operating_cost,
            notarization_cost: self.notarization_cost,
            totals: self.totals,
            created_at,
        }
    }
}

/// Caller-supplied terms for a new or updated projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProjection {
    pub capital: Decimal,
    pub term: u32,
    pub start_date: NaiveDate,
    pub product_id: u32,
    pub origin: CapitalOrigin,
    pub periodicity: Periodicity,
    pub extra_contribution: Decimal,
    pub operating_cost: Decimal,
    pub notarization_cost: Decimal,
}

impl NewProjection {
    pub fn validate(&self) -> Result<()> {
        if self.capital <= Decimal::ZERO {
            return Err(ProjectionError::InvalidParameters(format!(
                "capital must be positive, got {}",
                self.capital
            )));
        }
        self.schedule_parameters(Decimal::ZERO).validate()
    }

    /// Simulation inputs at the given rate
    pub fn schedule_parameters(&self, rate: Decimal) -> ScheduleParameters {
        ScheduleParameters {
            capital: self.capital,
            start_date: self.start_date,
            term: self.term,
            rate,
            extra_contribution: self.extra_contribution,
            operating_cost: self.operating_cost,
            notarization_cost: self.notarization_cost,
            origin: self.origin,
            periodicity: self.periodicity,
        }
    }
}
