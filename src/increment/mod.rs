//! Mid-life capital increments ("adendum")

mod splicer;

pub use splicer::{IncrementSplicer, SplicedSchedule};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request to add capital to a projection at a given period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementRequest {
    pub projection_id: u64,
    /// 1-based period receiving the new capital
    pub period: u32,
    pub amount: Decimal,
}
