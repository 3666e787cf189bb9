//! Period records and the schedule that owns them

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::totals::{ProjectionAggregator, ScheduleTotals};

/// A single period of a payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    // Timing
    pub period: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rate: Decimal,

    // Capital
    pub opening_capital: Decimal,
    pub extra_contribution: Decimal,
    pub operating_base: Decimal,

    // Interest and costs
    pub gross_interest: Decimal,
    pub is_final: bool,
    pub notarization_cost: Decimal,
    pub payout_triggered: bool,
    pub operating_cost: Decimal,

    // Renta
    pub net_renta: Decimal,
    pub cumulative_net_renta: Decimal,
    pub book_value: Decimal,

    // Cash
    pub cash_payout: Decimal,
    pub closing_capital: Decimal,
}

impl PeriodRecord {
    /// Create a period with zeroed amounts
    pub fn new(period: u32, start_date: NaiveDate, end_date: NaiveDate, rate: Decimal) -> Self {
        Self {
            period,
            start_date,
            end_date,
            rate,
            opening_capital: Decimal::ZERO,
            extra_contribution: Decimal::ZERO,
            operating_base: Decimal::ZERO,
            gross_interest: Decimal::ZERO,
            is_final: false,
            notarization_cost: Decimal::ZERO,
            payout_triggered: false,
            operating_cost: Decimal::ZERO,
            net_renta: Decimal::ZERO,
            cumulative_net_renta: Decimal::ZERO,
            book_value: Decimal::ZERO,
            cash_payout: Decimal::ZERO,
            closing_capital: Decimal::ZERO,
        }
    }
}

/// Ordered periods plus the totals derived from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub periods: Vec<PeriodRecord>,
    pub totals: ScheduleTotals,
}

impl Schedule {
    /// Build a schedule whose totals are reduced from its own periods
    pub fn from_periods(periods: Vec<PeriodRecord>) -> Self {
        let totals = ProjectionAggregator::recompute(&periods);
        Self { periods, totals }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Period by 1-based index
    pub fn period(&self, period: u32) -> Option<&PeriodRecord> {
        if period == 0 {
            return None;
        }
        self.periods.get(period as usize - 1)
    }

    pub fn last(&self) -> Option<&PeriodRecord> {
        self.periods.last()
    }
}
