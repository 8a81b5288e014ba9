//! Price every snapshot in a directory
//!
//! Passes are independent and run in parallel. Outputs one CSV summary row
//! per snapshot, zero totals for passes that failed.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::Serialize;

use premium_quote::assumptions::{Assumptions, ProductRules};
use premium_quote::money::Amount;
use premium_quote::policy::{load_policy_inputs_from_dir, PolicyInput, DOB_FORMAT};
use premium_quote::ScenarioRunner;

#[derive(Parser, Debug)]
#[command(name = "quote_batch", about = "Price a directory of policy snapshots")]
struct Args {
    /// Directory of snapshot JSON files
    dir: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = "quote_batch_output.csv")]
    output: PathBuf,

    /// Directory of rate tables (CSV); bundled tables when omitted
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Product rules override (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Reference date, DD/MM/YYYY (defaults to today)
    #[arg(long)]
    as_of: Option<String>,
}

/// One CSV row per snapshot
#[derive(Debug, Serialize)]
struct BatchRow {
    file: String,
    persons: usize,
    frequency: &'static str,
    base_main: Amount,
    extra: Amount,
    total_riders: Amount,
    total: Amount,
    per_period: Amount,
    annual_equivalent: Amount,
    variance: i64,
    validation_problems: usize,
    error: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let reference = match &args.as_of {
        Some(text) => NaiveDate::parse_from_str(text, DOB_FORMAT)
            .with_context(|| format!("invalid --as-of date '{text}'"))?,
        None => Local::now().date_naive(),
    };

    let mut assumptions = match &args.rates {
        Some(dir) => Assumptions::from_csv_path(dir)?,
        None => Assumptions::bundled()?,
    };
    if let Some(path) = &args.rules {
        assumptions = assumptions.with_rules(ProductRules::from_json_path(path)?);
    }
    let runner = ScenarioRunner::with_assumptions(assumptions);

    println!("Loading snapshots from {}...", args.dir.display());
    let snapshots = load_policy_inputs_from_dir(&args.dir)
        .with_context(|| format!("reading snapshots from {}", args.dir.display()))?;
    println!("Loaded {} snapshots in {:?}", snapshots.len(), start.elapsed());

    let (paths, inputs): (Vec<PathBuf>, Vec<PolicyInput>) = snapshots.into_iter().unzip();

    let run_start = Instant::now();
    let outcomes = runner.run_batch(&inputs, reference);
    println!("Priced {} snapshots in {:?}", outcomes.len(), run_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut failed = 0;
    let mut grand_total: Amount = 0;

    for ((path, input), outcome) in paths.iter().zip(&inputs).zip(&outcomes) {
        let (summary, error) = outcome.summary_or_zero();
        let frequency = outcome.result.as_ref().ok().map(|q| q.frequency);
        if error.is_some() {
            failed += 1;
        }
        grand_total += summary.total;

        writer.serialize(BatchRow {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            persons: input.persons().count(),
            frequency: input.frequency.as_str(),
            base_main: summary.base_main,
            extra: summary.extra,
            total_riders: summary.total_riders,
            total: summary.total,
            per_period: frequency.map(|f| f.per_period).unwrap_or(0),
            annual_equivalent: frequency.map(|f| f.annual_equivalent).unwrap_or(0),
            variance: frequency.map(|f| f.variance).unwrap_or(0),
            validation_problems: outcome.validation.len(),
            error: error.unwrap_or_default(),
        })?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());
    println!("\nBatch Summary:");
    println!("  Snapshots:     {}", outcomes.len());
    println!("  Failed passes: {}", failed);
    println!("  Annual total:  {}", grand_total);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
