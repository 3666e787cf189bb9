//! Create, update and increment projections

use log::{info, warn};

use crate::config::EngineConfig;
use crate::error::{ProjectionError, Result};
use crate::increment::{IncrementRequest, IncrementSplicer};
use crate::rates::{RateQuery, RateTier, RateTierResolver};
use crate::schedule::{AmortizationSimulator, Schedule};
use crate::store::{
    IncrementLedger, IncrementRecord, NewScheduleVersion, ProjectionRepository, ScheduleRepository,
    ScheduleVersion, ScheduleVersionStore,
};
use super::{NewProjection, Projection, ProjectionDraft};

/// Entry point for the projection operations.
///
/// Every operation computes its complete schedule before writing anything.
/// If one of its writes then fails, the writes already made are undone, so
/// a failed operation leaves the store as it found it.
pub struct ProjectionService<R, S> {
    resolver: R,
    store: S,
    simulator: AmortizationSimulator,
}

impl<R, S> ProjectionService<R, S>
where
    R: RateTierResolver,
    S: ScheduleRepository + ProjectionRepository + IncrementLedger,
{
    pub fn new(resolver: R, store: S, config: EngineConfig) -> Self {
        Self {
            resolver,
            store,
            simulator: AmortizationSimulator::new(config),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn simulator(&self) -> &AmortizationSimulator {
        &self.simulator
    }

    /// Price a new projection and persist it with its first schedule version
    pub fn create_projection(&mut self, request: &NewProjection) -> Result<(Projection, ScheduleVersion)> {
        let (tier, schedule) = self.price(request)?;

        let projection = self.store.insert_projection(draft(request, &tier, &schedule, None, None))?;
        let version = match self.store.save(NewScheduleVersion {
            projection_id: projection.id,
            version: 1,
            derived_from: None,
            periods: schedule.periods,
        }) {
            Ok(version) => version,
            Err(err) => {
                undo("projection", projection.id, self.store.remove_projection(projection.id));
                return Err(err);
            }
        };

        info!(
            "created projection {} (tier {}, {} periods) with schedule version {}",
            projection.id, tier.tier_id, projection.term, version.id
        );
        Ok((projection, version))
    }

    /// Re-price a projection with new terms.
    ///
    /// Produces a new projection in the same lineage; its schedule supersedes
    /// the current version of the replaced projection.
    pub fn update_projection(
        &mut self,
        projection_id: u64,
        request: &NewProjection,
    ) -> Result<(Projection, ScheduleVersion)> {
        let previous = self.projection(projection_id)?;
        let current = self.store.active_or_latest(previous.id)?;
        let (tier, schedule) = self.price(request)?;

        let projection = self.store.insert_projection(draft(
            request,
            &tier,
            &schedule,
            Some(previous.investment_id),
            Some(previous.id),
        ))?;
        let version = match self.store.supersede(
            previous.id,
            NewScheduleVersion {
                projection_id: projection.id,
                version: current.version + 1,
                derived_from: None,
                periods: schedule.periods,
            },
        ) {
            Ok(version) => version,
            Err(err) => {
                undo("projection", projection.id, self.store.remove_projection(projection.id));
                return Err(err);
            }
        };

        info!(
            "projection {} replaced by {} (schedule version {} -> {})",
            previous.id, projection.id, current.id, version.id
        );
        Ok((projection, version))
    }

    /// Add capital to a projection from a given period onwards
    pub fn increment_projection(&mut self, request: &IncrementRequest) -> Result<(Projection, ScheduleVersion)> {
        let original = self.projection(request.projection_id)?;
        let source = self.store.active_or_latest(original.id)?;

        let spliced = IncrementSplicer::new(&self.simulator).splice(
            &source,
            &original,
            request.period,
            request.amount,
            &self.resolver,
            &self.store,
        )?;

        self.store.record_increment(IncrementRecord {
            investment_id: original.investment_id,
            period: request.period,
            amount: request.amount,
            source_projection_id: original.id,
        })?;

        let investment_id = original.investment_id;

        let projection = match self.store.insert_projection(ProjectionDraft {
            investment_id: Some(investment_id),
            derived_from: Some(original.id),
            rate_tier_id: spliced.rate_tier.tier_id,
            rate: spliced.rate_tier.rate,
            capital: spliced.capital,
            totals: spliced.schedule.totals.clone(),
            ..draft_from(&original)
        }) {
            Ok(projection) => projection,
            Err(err) => {
                undo("increment slot", investment_id, self.store.release_increment(investment_id, request.period));
                return Err(err);
            }
        };
        let version = match self.store.insert_derived(NewScheduleVersion {
            projection_id: projection.id,
            version: source.version + 1,
            derived_from: Some(source.id),
            periods: spliced.schedule.periods,
        }) {
            Ok(version) => version,
            Err(err) => {
                undo("projection", projection.id, self.store.remove_projection(projection.id));
                undo("increment slot", investment_id, self.store.release_increment(investment_id, request.period));
                return Err(err);
            }
        };

        warn!(
            "increment on projection {} left its schedule version {} active alongside version {}",
            original.id, source.id, version.id
        );
        info!(
            "incremented projection {} by {} at period {} into projection {}",
            original.id, request.amount, request.period, projection.id
        );
        Ok((projection, version))
    }

    /// Current schedule of a projection: the active version, else the latest
    pub fn current_schedule(&self, projection_id: u64) -> Result<ScheduleVersion> {
        self.store.active_or_latest(projection_id)
    }

    /// All schedule versions stored for a projection
    pub fn schedule_history(&self, projection_id: u64) -> Result<Vec<ScheduleVersion>> {
        self.store.history(projection_id)
    }

    pub fn projection(&self, projection_id: u64) -> Result<Projection> {
        self.store
            .get_projection(projection_id)?
            .ok_or(ProjectionError::ProjectionNotFound { projection_id })
    }

    /// Resolve the tier for a request and simulate its schedule
    fn price(&self, request: &NewProjection) -> Result<(RateTier, Schedule)> {
        request.validate()?;

        let query = RateQuery {
            product_id: request.product_id,
            term: request.term,
            origin: request.origin,
            amount: request.capital,
        };
        let tier = self
            .resolver
            .resolve_rate(&query)?
            .ok_or(ProjectionError::NoMatchingRateTier {
                product_id: query.product_id,
                term: query.term,
                origin: query.origin,
                amount: query.amount,
            })?;

        let schedule = self.simulator.simulate(&request.schedule_parameters(tier.rate))?;
        Ok((tier, schedule))
    }
}

/// Report a compensating write that failed; the original error is what the caller sees
fn undo(what: &str, id: u64, result: Result<()>) {
    if let Err(err) = result {
        warn!("could not roll back {} {}: {}", what, id, err);
    }
}

fn draft(
    request: &NewProjection,
    tier: &RateTier,
    schedule: &Schedule,
    investment_id: Option<u64>,
    derived_from: Option<u64>,
) -> ProjectionDraft {
    ProjectionDraft {
        investment_id,
        derived_from,
        product_id: request.product_id,
        term: request.term,
        rate_tier_id: tier.tier_id,
        rate: tier.rate,
        capital: request.capital,
        origin: request.origin,
        periodicity: request.periodicity,
        start_date: request.start_date,
        extra_contribution: request.extra_contribution,
        operating_cost: request.operating_cost,
        notarization_cost: request.notarization_cost,
        totals: schedule.totals.clone(),
    }
}

fn draft_from(projection: &Projection) -> ProjectionDraft {
    ProjectionDraft {
        investment_id: Some(projection.investment_id),
        derived_from: projection.derived_from,
        product_id: projection.product_id,
        term: projection.term,
        rate_tier_id: projection.rate_tier_id,
        rate: projection.rate,
        capital: projection.capital,
        origin: projection.origin,
        periodicity: projection.periodicity,
        start_date: projection.start_date,
        extra_contribution: projection.extra_contribution,
        operating_cost: projection.operating_cost,
        notarization_cost: projection.notarization_cost,
        totals: projection.totals.clone(),
    }
}
