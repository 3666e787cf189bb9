//! Aggregate totals of a schedule

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::PeriodRecord;

/// Summary figures derived from a schedule's periods
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub total_interest: Decimal,
    pub total_operating_cost: Decimal,
    pub total_extra_contributions: Decimal,
    pub total_net_renta: Decimal,
    /// Book value of the last period
    pub final_book_value: Decimal,
    /// Cash paid out on the last period
    pub final_liquidation_value: Decimal,
    pub start_date: Option<NaiveDate>,
    /// Start of the first period carrying a contribution
    pub increment_date: Option<NaiveDate>,
}

/// Reduces a period list to its totals.
///
/// Sums are plain additions of already-rounded per-period figures, so a
/// freshly simulated schedule and a spliced one are totalled identically.
pub struct ProjectionAggregator;

impl ProjectionAggregator {
    pub fn recompute(periods: &[PeriodRecord]) -> ScheduleTotals {
        let mut totals = ScheduleTotals {
            start_date: periods.first().map(|p| p.start_date),
            ..Default::default()
        };

        for period in periods {
            totals.total_interest += period.gross_interest;
            totals.total_operating_cost += period.operating_cost;
            totals.total_extra_contributions += period.extra_contribution;
            totals.total_net_renta += period.net_renta;

            if totals.increment_date.is_none() && period.extra_contribution > Decimal::ZERO {
                totals.increment_date = Some(period.start_date);
            }
        }

        if let Some(last) = periods.last() {
            totals.final_book_value = last.book_value;
            totals.final_liquidation_value = last.cash_payout;
        }

        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    #[test]
    fn test_empty_schedule() {
        let totals = ProjectionAggregator::recompute(&[]);
        assert_eq!(totals, ScheduleTotals::default());
    }

    #[test]
    fn test_recompute_sums_and_markers() {
        let mut first = PeriodRecord::new(1, date(1), date(2), dec!(1));
        first.gross_interest = dec!(10.00);
        first.net_renta = dec!(10.00);

        let mut second = PeriodRecord::new(2, date(2), date(3), dec!(1));
        second.extra_contribution = dec!(250);
        second.gross_interest = dec!(12.50);
        second.operating_cost = dec!(1.13);
        second.net_renta = dec!(21.37);
        second.book_value = dec!(1262.50);
        second.cash_payout = dec!(1271.37);

        let totals = ProjectionAggregator::recompute(&[first, second]);

        assert_eq!(totals.total_interest, dec!(22.50));
        assert_eq!(totals.total_operating_cost, dec!(1.13));
        assert_eq!(totals.total_extra_contributions, dec!(250));
        assert_eq!(totals.total_net_renta, dec!(31.37));
        assert_eq!(totals.final_book_value, dec!(1262.50));
        assert_eq!(totals.final_liquidation_value, dec!(1271.37));
        assert_eq!(totals.start_date, Some(date(1)));
        assert_eq!(totals.increment_date, Some(date(2)));
    }
}
