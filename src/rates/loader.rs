//! Load rate tiers from CSV
//!
//! Expected header: `tier_id,product_id,term,origin,min_amount,max_amount,rate`.
//! An empty `max_amount` makes the tier open-ended.

use csv::Reader;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ProjectionError, Result};
use crate::schedule::CapitalOrigin;
use super::RateTier;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    tier_id: u32,
    product_id: u32,
    term: u32,
    origin: String,
    min_amount: String,
    max_amount: String,
    rate: String,
}

impl CsvRow {
    fn to_tier(self) -> Result<RateTier> {
        let origin = CapitalOrigin::parse(&self.origin)
            .map_err(|_| ProjectionError::RateTable(format!("tier {}: unknown origin {}", self.tier_id, self.origin)))?;

        let max_amount = match self.max_amount.trim() {
            "" => None,
            value => Some(parse_decimal(self.tier_id, "max_amount", value)?),
        };

        let tier = RateTier {
            tier_id: self.tier_id,
            product_id: self.product_id,
            term: self.term,
            origin,
            min_amount: parse_decimal(self.tier_id, "min_amount", &self.min_amount)?,
            max_amount,
            rate: parse_decimal(self.tier_id, "rate", &self.rate)?,
        };

        if let Some(max) = tier.max_amount {
            if max <= tier.min_amount {
                return Err(ProjectionError::RateTable(format!(
                    "tier {}: max_amount {} not above min_amount {}",
                    tier.tier_id, max, tier.min_amount
                )));
            }
        }
        Ok(tier)
    }
}

fn parse_decimal(tier_id: u32, column: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| ProjectionError::RateTable(format!("tier {}: bad {} '{}': {}", tier_id, column, value, e)))
}

/// Load all rate tiers from a CSV file
pub fn load_rate_tiers<P: AsRef<Path>>(path: P) -> Result<Vec<RateTier>> {
    let reader = Reader::from_path(path)?;
    read_tiers(reader)
}

/// Load rate tiers from any reader
pub fn load_rate_tiers_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<RateTier>> {
    read_tiers(Reader::from_reader(reader))
}

fn read_tiers<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<RateTier>> {
    let mut tiers = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        tiers.push(row.to_tier()?);
    }

    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const TIERS: &str = "\
tier_id,product_id,term,origin,min_amount,max_amount,rate
1,7,12,local,1000,50000,1.10
2,7,12,local,50000,,1.25
3,7,12,foreign,1000,,0.95
";

    #[test]
    fn test_load_from_reader() {
        let tiers = load_rate_tiers_from_reader(TIERS.as_bytes()).unwrap();

        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].max_amount, Some(dec!(50000)));
        assert_eq!(tiers[1].max_amount, None);
        assert_eq!(tiers[1].rate, dec!(1.25));
        assert_eq!(tiers[2].origin, CapitalOrigin::Foreign);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TIERS.as_bytes()).unwrap();

        let tiers = load_rate_tiers(file.path()).unwrap();
        assert_eq!(tiers.len(), 3);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let bad_origin = "tier_id,product_id,term,origin,min_amount,max_amount,rate\n1,7,12,mars,0,,1\n";
        assert!(matches!(
            load_rate_tiers_from_reader(bad_origin.as_bytes()),
            Err(ProjectionError::RateTable(_))
        ));

        let inverted = "tier_id,product_id,term,origin,min_amount,max_amount,rate\n1,7,12,local,500,100,1\n";
        assert!(load_rate_tiers_from_reader(inverted.as_bytes()).is_err());

        let bad_rate = "tier_id,product_id,term,origin,min_amount,max_amount,rate\n1,7,12,local,0,,abc\n";
        assert!(load_rate_tiers_from_reader(bad_rate.as_bytes()).is_err());
    }
}
