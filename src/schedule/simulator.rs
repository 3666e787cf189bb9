//! Period-by-period amortization simulator

use chrono::{Months, NaiveDate};
use log::debug;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::{ProjectionError, Result};
use super::params::{Periodicity, ScheduleParameters};
use super::period::{PeriodRecord, Schedule};
use super::state::SimulationState;

/// Builds payment schedules from simulation parameters
#[derive(Debug, Clone, Default)]
pub struct AmortizationSimulator {
    config: EngineConfig,
}

impl AmortizationSimulator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Simulate a full schedule.
    ///
    /// Deterministic: the same parameters always produce the same periods.
    /// Fails before computing anything if the parameters are invalid.
    pub fn simulate(&self, params: &ScheduleParameters) -> Result<Schedule> {
        params.validate()?;

        let mut state = SimulationState::from_params(params);
        let mut periods = Vec::with_capacity(params.term as usize);

        for _ in 0..params.term {
            let row = self.calculate_period(params, &mut state)?;
            state.advance(row.closing_capital);
            periods.push(row);
        }

        let schedule = Schedule::from_periods(periods);
        debug!(
            "simulated {} periods from {}: interest={} net_renta={} liquidation={}",
            schedule.len(),
            params.start_date,
            schedule.totals.total_interest,
            schedule.totals.total_net_renta,
            schedule.totals.final_liquidation_value,
        );
        Ok(schedule)
    }

    /// Calculate one period and update the carried accrual state
    fn calculate_period(&self, params: &ScheduleParameters, state: &mut SimulationState) -> Result<PeriodRecord> {
        let index = state.period_index;
        let is_final = index + 1 == params.term;
        let (start_date, end_date) = period_dates(params.start_date, index)?;

        let mut row = PeriodRecord::new(index + 1, start_date, end_date, params.rate);
        row.is_final = is_final;
        row.opening_capital = state.capital;

        // Contribution lands on the first period only
        if index == 0 {
            row.extra_contribution = params.extra_contribution;
        }
        row.operating_base = checked(state.capital.checked_add(row.extra_contribution), "operating base")?;

        row.gross_interest = if state.in_grace(params.origin) {
            Decimal::ZERO
        } else {
            let accrued = row
                .operating_base
                .checked_mul(params.rate)
                .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED));
            self.config.round_money(checked(accrued, "gross interest")?)
        };

        if is_final {
            row.notarization_cost = params.notarization_cost;
        }

        state.unpaid_interest = checked(state.unpaid_interest.checked_add(row.gross_interest), "accrued interest")?;
        row.payout_triggered = state.payout_due(params.periodicity, params.origin, is_final);

        if row.payout_triggered {
            let cost = state.unpaid_interest.checked_mul(self.config.operating_cost_rate);
            row.operating_cost = self.config.round_money(checked(cost, "operating cost")?);
            let realized = if params.periodicity.is_lump_sum() && is_final {
                row.gross_interest
            } else {
                state.unpaid_interest
            };
            row.net_renta = (realized - row.operating_cost).max(Decimal::ZERO);
            state.unpaid_interest = Decimal::ZERO;
        } else {
            row.net_renta = row.gross_interest;
        }

        state.cumulative_net_renta = checked(state.cumulative_net_renta.checked_add(row.net_renta), "cumulative renta")?;
        row.cumulative_net_renta = state.cumulative_net_renta;
        row.book_value = checked(state.capital.checked_add(row.gross_interest), "book value")?;

        row.cash_payout = match (row.payout_triggered, is_final) {
            (true, true) if params.periodicity.is_lump_sum() => row.book_value - row.operating_cost,
            (true, true) => checked(state.capital.checked_add(row.net_renta), "cash payout")?,
            (true, false) => row.net_renta,
            (false, _) => Decimal::ZERO,
        };

        row.closing_capital = if is_final {
            Decimal::ZERO
        } else {
            match params.periodicity {
                // Interest compounds until the single settlement
                Periodicity::LumpSum => checked(state.capital.checked_add(row.net_renta), "closing capital")?,
                Periodicity::Every(_) => state.capital,
            }
        };

        Ok(row)
    }
}

/// Start and end date of a 0-indexed monthly period
fn period_dates(schedule_start: NaiveDate, index: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = schedule_start
        .checked_add_months(Months::new(index))
        .ok_or_else(|| date_overflow(schedule_start, index))?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| date_overflow(schedule_start, index + 1))?;
    Ok((start, end))
}

/// Arithmetic beyond `Decimal`'s range is an input problem, not a crash
fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    value.ok_or_else(|| ProjectionError::InvalidParameters(format!("{} out of range", what)))
}

fn date_overflow(start: NaiveDate, months: u32) -> ProjectionError {
    ProjectionError::InvalidParameters(format!("{} plus {} months is out of range", start, months))
}
