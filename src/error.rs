//! Error taxonomy for the projection engine

use rust_decimal::Decimal;
use thiserror::Error;

use crate::schedule::CapitalOrigin;

/// Errors surfaced by simulation, splicing and persistence
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("No rate configuration for product {product_id}, term {term}, origin {origin}, amount {amount}")]
    NoMatchingRateTier {
        product_id: u32,
        term: u32,
        origin: CapitalOrigin,
        amount: Decimal,
    },

    #[error("No active schedule for projection {projection_id}")]
    MissingActiveSchedule { projection_id: u64 },

    #[error("Duplicate increment for investment {investment_id}, period {period}")]
    DuplicateIncrement { investment_id: u64, period: u32 },

    #[error("Projection {projection_id} not found")]
    ProjectionNotFound { projection_id: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Rate table error: {0}")]
    RateTable(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
