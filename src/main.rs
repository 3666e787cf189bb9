//! Investment Projection CLI
//!
//! Simulate payment schedules and try increments against a rate table

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use investment_projection::{
    AmortizationSimulator, CapitalOrigin, EngineConfig, IncrementRequest, MemoryStore, NewProjection,
    PeriodRecord, Periodicity, ProjectionService, RateTierTable, ScheduleParameters, ScheduleTotals,
};

#[derive(Parser)]
#[command(name = "investment-projection", version, about = "Payment schedule projections")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a schedule at an explicit rate
    Simulate {
        #[command(flatten)]
        terms: Terms,

        /// Period rate in percent
        #[arg(long)]
        rate: Decimal,

        #[command(flatten)]
        output: Output,
    },
    /// Price a projection from a rate table, optionally applying an increment
    Project {
        #[command(flatten)]
        terms: Terms,

        /// Rate tier CSV
        #[arg(long)]
        rates: PathBuf,

        #[arg(long)]
        product: u32,

        /// Accepted and stored, not charged per period
        #[arg(long, default_value = "0")]
        operating_cost: Decimal,

        /// 1-based period receiving an increment
        #[arg(long, requires = "increment_amount")]
        increment_period: Option<u32>,

        #[arg(long, requires = "increment_period")]
        increment_amount: Option<Decimal>,

        #[command(flatten)]
        output: Output,
    },
}

#[derive(Args)]
struct Terms {
    #[arg(long)]
    capital: Decimal,

    /// Number of monthly periods
    #[arg(long)]
    term: u32,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// 0 = lump sum at maturity, N = payout every N periods
    #[arg(long, default_value_t = 1)]
    periodicity: i64,

    /// Capital of local origin
    #[arg(long)]
    local: bool,

    /// Contribution applied at period 1
    #[arg(long, default_value = "0")]
    extra: Decimal,

    /// Charged on the final period
    #[arg(long, default_value = "0")]
    notarization: Decimal,
}

impl Terms {
    fn origin(&self) -> CapitalOrigin {
        if self.local {
            CapitalOrigin::Local
        } else {
            CapitalOrigin::Foreign
        }
    }
}

#[derive(Args)]
struct Output {
    /// Write the full schedule to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Simulate { terms, rate, output } => {
            let params = ScheduleParameters {
                capital: terms.capital,
                start_date: terms.start,
                term: terms.term,
                rate,
                extra_contribution: terms.extra,
                operating_cost: Decimal::ZERO,
                notarization_cost: terms.notarization,
                origin: terms.origin(),
                periodicity: Periodicity::from_code(terms.periodicity)?,
            };
            let schedule = AmortizationSimulator::new(EngineConfig::default()).simulate(&params)?;
            emit("Schedule", &schedule.periods, &schedule.totals, &output, None)?;
        }
        Command::Project {
            terms,
            rates,
            product,
            operating_cost,
            increment_period,
            increment_amount,
            output,
        } => {
            let table = RateTierTable::from_csv_path(&rates)
                .with_context(|| format!("loading rate tiers from {}", rates.display()))?;
            if table.is_empty() {
                bail!("no rate tiers in {}", rates.display());
            }

            let mut service = ProjectionService::new(table, MemoryStore::new(), EngineConfig::default());
            let request = NewProjection {
                capital: terms.capital,
                term: terms.term,
                start_date: terms.start,
                product_id: product,
                origin: terms.origin(),
                periodicity: Periodicity::from_code(terms.periodicity)?,
                extra_contribution: terms.extra,
                operating_cost,
                notarization_cost: terms.notarization,
            };
            let (projection, version) = service.create_projection(&request)?;
            let title = format!(
                "Projection {} (tier {}, rate {}%, version {})",
                projection.id, projection.rate_tier_id, projection.rate, version.version
            );
            emit(&title, &version.periods, &projection.totals, &output, Some("original"))?;

            if let (Some(period), Some(amount)) = (increment_period, increment_amount) {
                let (incremented, spliced) = service.increment_projection(&IncrementRequest {
                    projection_id: projection.id,
                    period,
                    amount,
                })?;
                let title = format!(
                    "Projection {} after +{} at period {} (tier {}, rate {}%, version {})",
                    incremented.id, amount, period, incremented.rate_tier_id, incremented.rate, spliced.version
                );
                emit(&title, &spliced.periods, &incremented.totals, &output, Some("increment"))?;
            }
        }
    }

    Ok(())
}

/// Print a schedule and optionally write it to CSV
fn emit(
    title: &str,
    periods: &[PeriodRecord],
    totals: &ScheduleTotals,
    output: &Output,
    csv_suffix: Option<&str>,
) -> anyhow::Result<()> {
    if output.json {
        let doc = serde_json::json!({ "title": title, "periods": periods, "totals": totals });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_table(title, periods, totals);
    }

    if let Some(path) = &output.csv {
        let path = match csv_suffix {
            Some(suffix) => suffixed(path, suffix),
            None => path.clone(),
        };
        write_csv(&path, periods).with_context(|| format!("writing {}", path.display()))?;
        if !output.json {
            println!("Full schedule written to: {}", path.display());
        }
    }
    Ok(())
}

fn print_table(title: &str, periods: &[PeriodRecord], totals: &ScheduleTotals) {
    println!("{}", title);
    println!("{:>4} {:>10} {:>10} {:>14} {:>10} {:>10} {:>10} {:>5} {:>14} {:>14}",
        "Per", "Start", "End", "Capital", "Extra", "Interest", "OpCost", "Pay", "Cash", "Closing");
    println!("{}", "-".repeat(112));

    for row in periods {
        println!("{:>4} {:>10} {:>10} {:>14.2} {:>10.2} {:>10.2} {:>10.2} {:>5} {:>14.2} {:>14.2}",
            row.period,
            row.start_date,
            row.end_date,
            row.opening_capital,
            row.extra_contribution,
            row.gross_interest,
            row.operating_cost,
            if row.payout_triggered { "yes" } else { "" },
            row.cash_payout,
            row.closing_capital,
        );
    }

    println!("\nTotals:");
    println!("  Interest:        {:.2}", totals.total_interest);
    println!("  Operating cost:  {:.2}", totals.total_operating_cost);
    println!("  Contributions:   {:.2}", totals.total_extra_contributions);
    println!("  Net renta:       {:.2}", totals.total_net_renta);
    println!("  Final book value: {:.2}", totals.final_book_value);
    println!("  Liquidation:     {:.2}", totals.final_liquidation_value);
    if let Some(date) = totals.increment_date {
        println!("  Increment date:  {}", date);
    }
    println!();
}

fn write_csv(path: &Path, periods: &[PeriodRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in periods {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// `out.csv` + `increment` -> `out_increment.csv`
fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("schedule");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    path.with_file_name(format!("{}_{}.{}", stem, suffix, ext))
}
