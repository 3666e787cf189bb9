//! Simulation inputs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProjectionError, Result};

/// Where the invested capital comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapitalOrigin {
    /// Domestic capital, earns no interest in its first period
    Local,
    /// Foreign capital
    Foreign,
}

impl CapitalOrigin {
    pub fn is_local(&self) -> bool {
        matches!(self, CapitalOrigin::Local)
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(CapitalOrigin::Local),
            "foreign" => Ok(CapitalOrigin::Foreign),
            other => Err(ProjectionError::InvalidParameters(format!(
                "unknown capital origin: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for CapitalOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapitalOrigin::Local => write!(f, "local"),
            CapitalOrigin::Foreign => write!(f, "foreign"),
        }
    }
}

/// How often accrued interest is paid out in cash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Periodicity {
    /// Single settlement at the end of the term (code 0)
    LumpSum,
    /// Payout every `n` periods (code n >= 1)
    Every(u32),
}

impl Periodicity {
    /// Build from the numeric code used by product configuration
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Periodicity::LumpSum),
            n if n > 0 && n <= u32::MAX as i64 => Ok(Periodicity::Every(n as u32)),
            n => Err(ProjectionError::InvalidParameters(format!(
                "payout periodicity must be >= 0, got {}",
                n
            ))),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Periodicity::LumpSum => 0,
            Periodicity::Every(n) => *n,
        }
    }

    pub fn is_lump_sum(&self) -> bool {
        matches!(self, Periodicity::LumpSum)
    }
}

/// Inputs for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleParameters {
    /// Opening capital of period 1
    pub capital: Decimal,

    /// Start date of period 1
    pub start_date: NaiveDate,

    /// Number of monthly periods
    pub term: u32,

    /// Period rate, in percent
    pub rate: Decimal,

    /// Lump contribution applied at period 1
    pub extra_contribution: Decimal,

    /// Accepted and carried, never charged per period
    pub operating_cost: Decimal,

    /// Charged on the final period only
    pub notarization_cost: Decimal,

    pub origin: CapitalOrigin,

    pub periodicity: Periodicity,
}

impl ScheduleParameters {
    /// Parameters with no contributions or costs
    pub fn new(
        capital: Decimal,
        start_date: NaiveDate,
        term: u32,
        rate: Decimal,
        origin: CapitalOrigin,
        periodicity: Periodicity,
    ) -> Self {
        Self {
            capital,
            start_date,
            term,
            rate,
            extra_contribution: Decimal::ZERO,
            operating_cost: Decimal::ZERO,
            notarization_cost: Decimal::ZERO,
            origin,
            periodicity,
        }
    }

    /// Reject inputs no schedule can be built from
    pub fn validate(&self) -> Result<()> {
        if self.term == 0 {
            return Err(ProjectionError::InvalidParameters(
                "term must be a positive number of periods".to_string(),
            ));
        }
        if let Periodicity::Every(0) = self.periodicity {
            return Err(ProjectionError::InvalidParameters(
                "payout periodicity of zero periods".to_string(),
            ));
        }
        let amounts = [
            ("capital", self.capital),
            ("rate", self.rate),
            ("extra contribution", self.extra_contribution),
            ("operating cost", self.operating_cost),
            ("notarization cost", self.notarization_cost),
        ];
        for (name, amount) in amounts {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(ProjectionError::InvalidParameters(format!(
                    "{} must not be negative, got {}",
                    name, amount
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> ScheduleParameters {
        ScheduleParameters::new(
            dec!(1000),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            12,
            dec!(1),
            CapitalOrigin::Foreign,
            Periodicity::Every(1),
        )
    }

    #[test]
    fn test_periodicity_codes() {
        assert_eq!(Periodicity::from_code(0).unwrap(), Periodicity::LumpSum);
        assert_eq!(Periodicity::from_code(3).unwrap(), Periodicity::Every(3));
        assert_eq!(Periodicity::Every(6).code(), 6);
        assert!(Periodicity::from_code(-1).is_err());
    }

    #[test]
    fn test_origin_parse() {
        assert_eq!(CapitalOrigin::parse("Local").unwrap(), CapitalOrigin::Local);
        assert_eq!(CapitalOrigin::parse(" foreign ").unwrap(), CapitalOrigin::Foreign);
        assert!(CapitalOrigin::parse("offshore").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(params().validate().is_ok());

        let zero_term = ScheduleParameters { term: 0, ..params() };
        assert!(matches!(
            zero_term.validate(),
            Err(ProjectionError::InvalidParameters(_))
        ));

        let negative = ScheduleParameters { capital: dec!(-1), ..params() };
        assert!(negative.validate().is_err());

        let every_zero = ScheduleParameters { periodicity: Periodicity::Every(0), ..params() };
        assert!(every_zero.validate().is_err());
    }
}
