//! Running state carried from one period to the next

use rust_decimal::Decimal;

use super::params::{CapitalOrigin, Periodicity, ScheduleParameters};

/// State of a schedule between two periods
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Period about to be computed (0-indexed)
    pub period_index: u32,

    /// Capital carried into the current period
    pub capital: Decimal,

    /// Interest accrued since the last cash payout
    pub unpaid_interest: Decimal,

    /// Periods counted toward the next payout
    pub periods_since_payout: u32,

    /// Running total of net renta
    pub cumulative_net_renta: Decimal,
}

impl SimulationState {
    /// Initialize state at the start of a schedule
    pub fn from_params(params: &ScheduleParameters) -> Self {
        Self {
            period_index: 0,
            capital: params.capital,
            unpaid_interest: Decimal::ZERO,
            periods_since_payout: 0,
            cumulative_net_renta: Decimal::ZERO,
        }
    }

    /// Whether the current period earns no interest under local-origin grace
    pub fn in_grace(&self, origin: CapitalOrigin) -> bool {
        origin.is_local() && self.period_index == 0
    }

    /// Advance the payout counter and report whether this period pays out.
    /// Resets the counter when it fires.
    pub fn payout_due(&mut self, periodicity: Periodicity, origin: CapitalOrigin, is_final: bool) -> bool {
        match periodicity {
            Periodicity::LumpSum => is_final,
            Periodicity::Every(n) => {
                // Local capital's grace period does not count toward the first payout
                if !self.in_grace(origin) {
                    self.periods_since_payout += 1;
                }
                let due = self.periods_since_payout >= n || is_final;
                if due {
                    self.periods_since_payout = 0;
                }
                due
            }
        }
    }

    /// Move to the next period
    pub fn advance(&mut self, closing_capital: Decimal) {
        self.capital = closing_capital;
        self.period_index += 1;
    }
}
