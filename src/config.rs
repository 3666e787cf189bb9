//! Engine configuration

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Share of realized interest charged as operating cost on payout
    pub operating_cost_rate: Decimal,

    /// Decimal places kept on every monetary field
    pub money_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operating_cost_rate: dec!(0.05), // 5% of accrued interest
            money_scale: 2,
        }
    }
}

impl EngineConfig {
    /// Round a monetary amount half-up to the configured scale
    pub fn round_money(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.money_scale, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_up() {
        let config = EngineConfig::default();

        assert_eq!(config.round_money(dec!(1.515)), dec!(1.52));
        assert_eq!(config.round_money(dec!(10.201)), dec!(10.20));
        assert_eq!(config.round_money(dec!(-0.005)), dec!(-0.01));
    }
}
