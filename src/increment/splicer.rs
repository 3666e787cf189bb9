//! Graft a re-simulated tail onto an existing schedule

use log::debug;
use rust_decimal::Decimal;

use crate::error::{ProjectionError, Result};
use crate::projection::Projection;
use crate::rates::{RateQuery, RateTier, RateTierResolver};
use crate::schedule::{AmortizationSimulator, PeriodRecord, Schedule, ScheduleParameters};
use crate::store::{IncrementLedger, ScheduleVersion};

/// Result of a splice, ready to be persisted
#[derive(Debug, Clone)]
pub struct SplicedSchedule {
    pub schedule: Schedule,
    /// Tier resolved for the increased capital
    pub rate_tier: RateTier,
    /// Capital base plus the increment
    pub capital: Decimal,
}

/// Splices an increment into a schedule.
///
/// Periods before the increment are copied as they are. The increment period
/// takes the new money into its contribution, operating base and closing
/// capital, while keeping its interest and payout figures. Remaining periods
/// are simulated afresh at the rate tier of the increased capital.
pub struct IncrementSplicer<'a> {
    simulator: &'a AmortizationSimulator,
}

impl<'a> IncrementSplicer<'a> {
    pub fn new(simulator: &'a AmortizationSimulator) -> Self {
        Self { simulator }
    }

    pub fn splice<R, L>(
        &self,
        original: &ScheduleVersion,
        projection: &Projection,
        period: u32,
        amount: Decimal,
        resolver: &R,
        ledger: &L,
    ) -> Result<SplicedSchedule>
    where
        R: RateTierResolver + ?Sized,
        L: IncrementLedger + ?Sized,
    {
        if amount <= Decimal::ZERO {
            return Err(ProjectionError::InvalidParameters(format!(
                "increment amount must be positive, got {}",
                amount
            )));
        }
        if period == 0 || period > projection.term {
            return Err(ProjectionError::InvalidParameters(format!(
                "increment period {} outside 1..={}",
                period, projection.term
            )));
        }
        if ledger.increment_exists(projection.investment_id, period)? {
            return Err(ProjectionError::DuplicateIncrement {
                investment_id: projection.investment_id,
                period,
            });
        }
        if original.periods.is_empty() {
            return Err(ProjectionError::MissingActiveSchedule {
                projection_id: projection.id,
            });
        }
        let index = period as usize - 1;
        if index >= original.periods.len() {
            return Err(ProjectionError::InvalidParameters(format!(
                "increment period {} beyond the {} stored periods",
                period,
                original.periods.len()
            )));
        }

        let capital_base = if index == 0 {
            original.periods[0].opening_capital
        } else {
            original.periods[index - 1].closing_capital
        };
        let capital = capital_base + amount;

        let query = RateQuery {
            product_id: projection.product_id,
            term: projection.term,
            origin: projection.origin,
            amount: capital,
        };
        let rate_tier = resolver
            .resolve_rate(&query)?
            .ok_or(ProjectionError::NoMatchingRateTier {
                product_id: query.product_id,
                term: query.term,
                origin: query.origin,
                amount: query.amount,
            })?;

        let mut periods: Vec<PeriodRecord> = original.periods[..index].to_vec();

        let remaining = projection.term - period;

        // Already priced: interest, costs and payout stay as they were
        let mut modified = original.periods[index].clone();
        modified.extra_contribution = amount;
        modified.operating_base += amount;
        if remaining == 0 {
            // Settled period: the new money leaves with the liquidation
            modified.cash_payout += amount;
        } else {
            modified.closing_capital += amount;
        }
        let tail_params = ScheduleParameters {
            capital: modified.closing_capital,
            start_date: modified.end_date,
            term: remaining,
            rate: rate_tier.rate,
            extra_contribution: Decimal::ZERO,
            operating_cost: projection.operating_cost,
            notarization_cost: projection.notarization_cost,
            origin: projection.origin,
            periodicity: projection.periodicity,
        };
        periods.push(modified);

        if remaining > 0 {
            let carried = periods[index].cumulative_net_renta;
            let tail = self.simulator.simulate(&tail_params)?;
            periods.extend(tail.periods.into_iter().enumerate().map(|(offset, mut row)| {
                row.period = period + 1 + offset as u32;
                row.cumulative_net_renta += carried;
                row
            }));
        }

        debug!(
            "spliced {} into period {} of schedule version {}: tier {} at {}%, {} periods re-simulated",
            amount, period, original.id, rate_tier.tier_id, rate_tier.rate, remaining
        );

        Ok(SplicedSchedule {
            schedule: Schedule::from_periods(periods),
            rate_tier,
            capital,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateTierTable;
    use crate::schedule::{CapitalOrigin, Periodicity, ScheduleTotals};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn projection(periodicity: Periodicity) -> Projection {
        Projection {
            id: 7,
            investment_id: 7,
            derived_from: None,
            product_id: 1,
            term: 4,
            rate_tier_id: 10,
            rate: dec!(1),
            capital: dec!(1000),
            origin: CapitalOrigin::Foreign,
            periodicity,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            extra_contribution: Decimal::ZERO,
            operating_cost: Decimal::ZERO,
            notarization_cost: dec!(50),
            totals: ScheduleTotals::default(),
            created_at: Utc::now(),
        }
    }

    fn source(projection: &Projection) -> ScheduleVersion {
        let schedule = AmortizationSimulator::default()
            .simulate(&projection.schedule_parameters())
            .unwrap();
        ScheduleVersion {
            id: 3,
            projection_id: projection.id,
            version: 1,
            active: true,
            created_at: Utc::now(),
            derived_from: None,
            periods: schedule.periods,
        }
    }

    fn tiers() -> RateTierTable {
        let tier = |tier_id, min, max, rate| RateTier {
            tier_id,
            product_id: 1,
            term: 4,
            origin: CapitalOrigin::Foreign,
            min_amount: min,
            max_amount: max,
            rate,
        };
        RateTierTable::new(vec![
            tier(10, dec!(0), Some(dec!(1200)), dec!(1)),
            tier(11, dec!(1200), None, dec!(1.2)),
        ])
    }

    fn splice(original: &ScheduleVersion, projection: &Projection, period: u32, amount: Decimal) -> Result<SplicedSchedule> {
        let simulator = AmortizationSimulator::default();
        IncrementSplicer::new(&simulator).splice(original, projection, period, amount, &tiers(), &MemoryStore::new())
    }

    #[test]
    fn test_increment_mid_schedule() {
        let projection = projection(Periodicity::Every(1));
        let original = source(&projection);
        let spliced = splice(&original, &projection, 2, dec!(500)).unwrap();
        let p = &spliced.schedule.periods;

        assert_eq!(p.len(), 4);
        assert_eq!(spliced.capital, dec!(1500));
        assert_eq!(spliced.rate_tier.tier_id, 11);

        // Elapsed period untouched
        assert_eq!(p[0], original.periods[0]);

        // Increment period: new money in, pricing unchanged
        let before = &original.periods[1];
        assert_eq!(p[1].extra_contribution, dec!(500));
        assert_eq!(p[1].operating_base, before.operating_base + dec!(500));
        assert_eq!(p[1].closing_capital, before.closing_capital + dec!(500));
        assert_eq!(p[1].gross_interest, before.gross_interest);
        assert_eq!(p[1].payout_triggered, before.payout_triggered);
        assert_eq!(p[1].cash_payout, before.cash_payout);
        assert_eq!(p[1].net_renta, before.net_renta);

        // Tail re-simulated from the new capital and end date
        assert_eq!(p[2].period, 3);
        assert_eq!(p[3].period, 4);
        assert_eq!(p[2].start_date, p[1].end_date);
        assert_eq!(p[2].opening_capital, dec!(1500));
        assert_eq!(p[2].rate, dec!(1.2));
        assert_eq!(p[2].gross_interest, dec!(18.00));

        // Running renta carries on from the prefix
        assert_eq!(p[2].cumulative_net_renta, p[1].cumulative_net_renta + p[2].net_renta);
        assert!(p.windows(2).all(|w| w[1].cumulative_net_renta >= w[0].cumulative_net_renta));
        let net: Decimal = p.iter().map(|r| r.net_renta).sum();
        assert_eq!(p[3].cumulative_net_renta, net);
        assert!(p[3].is_final);
        assert_eq!(p[3].closing_capital, Decimal::ZERO);
        assert_eq!(p[3].notarization_cost, dec!(50));

        let interest: Decimal = p.iter().map(|r| r.gross_interest).sum();
        assert_eq!(spliced.schedule.totals.total_interest, interest);
        assert_eq!(spliced.schedule.totals.total_interest, dec!(56.00));
        assert_eq!(spliced.schedule.totals.increment_date, Some(p[1].start_date));
    }

    #[test]
    fn test_increment_first_period_uses_opening_capital() {
        let projection = projection(Periodicity::LumpSum);
        let original = source(&projection);
        let spliced = splice(&original, &projection, 1, dec!(100)).unwrap();

        assert_eq!(spliced.capital, dec!(1100));
        assert_eq!(spliced.rate_tier.tier_id, 10);
        assert_eq!(spliced.schedule.periods[0].closing_capital, original.periods[0].closing_capital + dec!(100));
        assert_eq!(spliced.schedule.periods[1].opening_capital, dec!(1110.00));
    }

    #[test]
    fn test_prefix_identical_for_late_increment() {
        let projection = projection(Periodicity::Every(2));
        let original = source(&projection);
        let spliced = splice(&original, &projection, 4, dec!(250)).unwrap();

        assert_eq!(spliced.schedule.periods[..3], original.periods[..3]);
        assert_eq!(spliced.schedule.len(), 4);

        // No tail to simulate: the new money is paid out with the settlement
        let last = &spliced.schedule.periods[3];
        assert!(last.is_final);
        assert_eq!(last.closing_capital, Decimal::ZERO);
        assert_eq!(last.extra_contribution, dec!(250));
        assert_eq!(last.cash_payout, original.periods[3].cash_payout + dec!(250));
        assert_eq!(
            spliced.schedule.totals.final_liquidation_value,
            original.periods[3].cash_payout + dec!(250)
        );
    }

    #[test]
    fn test_rejects_bad_requests() {
        let projection = projection(Periodicity::Every(1));
        let original = source(&projection);

        assert!(matches!(
            splice(&original, &projection, 0, dec!(100)),
            Err(ProjectionError::InvalidParameters(_))
        ));
        assert!(matches!(
            splice(&original, &projection, 5, dec!(100)),
            Err(ProjectionError::InvalidParameters(_))
        ));
        assert!(matches!(
            splice(&original, &projection, 2, Decimal::ZERO),
            Err(ProjectionError::InvalidParameters(_))
        ));

        let empty = ScheduleVersion { periods: Vec::new(), ..original.clone() };
        assert!(matches!(
            splice(&empty, &projection, 2, dec!(100)),
            Err(ProjectionError::MissingActiveSchedule { projection_id: 7 })
        ));
    }

    #[test]
    fn test_no_tier_for_new_capital() {
        let projection = projection(Periodicity::Every(1));
        let original = source(&projection);
        let simulator = AmortizationSimulator::default();

        let result = IncrementSplicer::new(&simulator).splice(
            &original,
            &projection,
            2,
            dec!(500),
            &RateTierTable::default(),
            &MemoryStore::new(),
        );
        assert!(matches!(
            result,
            Err(ProjectionError::NoMatchingRateTier { amount, .. }) if amount == dec!(1500)
        ));
    }

    #[test]
    fn test_duplicate_period_rejected() {
        let projection = projection(Periodicity::Every(1));
        let original = source(&projection);
        let simulator = AmortizationSimulator::default();
        let mut ledger = MemoryStore::new();
        ledger
            .record_increment(crate::store::IncrementRecord {
                investment_id: 7,
                period: 2,
                amount: dec!(500),
                source_projection_id: 7,
            })
            .unwrap();

        let result = IncrementSplicer::new(&simulator).splice(&original, &projection, 2, dec!(500), &tiers(), &ledger);
        assert!(matches!(
            result,
            Err(ProjectionError::DuplicateIncrement { investment_id: 7, period: 2 })
        ));
    }
}
