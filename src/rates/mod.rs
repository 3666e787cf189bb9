//! Rate tier lookup
//!
//! The engine never prices a projection on its own: the rate comes from a
//! tier configured for (product, term, origin, amount). `RateTierResolver`
//! is the seam to whatever holds that configuration; `RateTierTable` is the
//! in-memory implementation, loadable from CSV.

mod table;
pub mod loader;

pub use table::RateTierTable;
pub use loader::{load_rate_tiers, load_rate_tiers_from_reader};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schedule::CapitalOrigin;

/// Lookup key for a rate tier
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuery {
    pub product_id: u32,
    pub term: u32,
    pub origin: CapitalOrigin,
    pub amount: Decimal,
}

/// A configured rate for an amount band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    pub tier_id: u32,
    pub product_id: u32,
    pub term: u32,
    pub origin: CapitalOrigin,
    /// Inclusive lower bound
    pub min_amount: Decimal,
    /// Exclusive upper bound, open-ended when absent
    pub max_amount: Option<Decimal>,
    /// Period rate, in percent
    pub rate: Decimal,
}

impl RateTier {
    pub fn matches(&self, query: &RateQuery) -> bool {
        self.product_id == query.product_id
            && self.term == query.term
            && self.origin == query.origin
            && query.amount >= self.min_amount
            && self.max_amount.map_or(true, |max| query.amount < max)
    }
}

/// Source of rate tiers.
///
/// `Ok(None)` means no tier matches; `Err` is reserved for a failing backend.
pub trait RateTierResolver {
    fn resolve_rate(&self, query: &RateQuery) -> Result<Option<RateTier>>;
}
