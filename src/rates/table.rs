//! In-memory rate tier table

use std::path::Path;

use crate::error::Result;
use super::{loader, RateQuery, RateTier, RateTierResolver};

/// Rate tiers held in memory, ordered by lower bound
#[derive(Debug, Clone, Default)]
pub struct RateTierTable {
    tiers: Vec<RateTier>,
}

impl RateTierTable {
    pub fn new(mut tiers: Vec<RateTier>) -> Self {
        tiers.sort_by(|a, b| a.min_amount.cmp(&b.min_amount).then(a.tier_id.cmp(&b.tier_id)));
        Self { tiers }
    }

    /// Load tiers from a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(loader::load_rate_tiers(path)?))
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl RateTierResolver for RateTierTable {
    fn resolve_rate(&self, query: &RateQuery) -> Result<Option<RateTier>> {
        Ok(self.tiers.iter().find(|t| t.matches(query)).cloned())
    }
}
