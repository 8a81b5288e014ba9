//! Premium Quote CLI
//!
//! Prices one policy snapshot and prints the per-person breakdown

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use premium_quote::assumptions::{Assumptions, ProductRules};
use premium_quote::policy::{load_policy_input, DOB_FORMAT};
use premium_quote::ScenarioRunner;

#[derive(Parser, Debug)]
#[command(name = "premium_quote", version, about = "Price a policy snapshot")]
struct Args {
    /// Policy snapshot (JSON)
    input: PathBuf,

    /// Directory of rate tables (CSV); bundled tables when omitted
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Product rules override (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Reference date, DD/MM/YYYY (defaults to today)
    #[arg(long)]
    as_of: Option<String>,

    /// Print the full outcome as JSON
    #[arg(long)]
    json: bool,

    /// Write a year-by-year premium illustration to this CSV file
    #[arg(long)]
    projection_csv: Option<PathBuf>,

    /// Illustrate to this age of the main person
    #[arg(long)]
    target_age: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let reference = match &args.as_of {
        Some(text) => NaiveDate::parse_from_str(text, DOB_FORMAT)
            .with_context(|| format!("invalid --as-of date '{text}'"))?,
        None => Local::now().date_naive(),
    };

    let mut assumptions = match &args.rates {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("loading rate tables from {}", dir.display()))?,
        None => Assumptions::bundled().context("loading bundled rate tables")?,
    };
    if let Some(path) = &args.rules {
        let rules = ProductRules::from_json_path(path)
            .with_context(|| format!("loading product rules from {}", path.display()))?;
        assumptions = assumptions.with_rules(rules);
    }
    let runner = ScenarioRunner::with_assumptions(assumptions);

    let input = load_policy_input(&args.input)
        .with_context(|| format!("reading snapshot {}", args.input.display()))?;
    let outcome = runner.run(&input, reference);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report())?);
    } else {
        println!("Premium Quote v{}", env!("CARGO_PKG_VERSION"));
        println!("==================\n");
        println!("Reference date: {}", reference.format(DOB_FORMAT));

        match &outcome.result {
            Ok(quote) => {
                println!(
                    "\n{:<12} {:>14} {:>12} {:>12} {:>12} {:>14}",
                    "Person", "Main", "Extra", "Riders", "Waiver", "Total"
                );
                println!("{}", "-".repeat(81));
                for person in quote.persons.iter() {
                    println!(
                        "{:<12} {:>14} {:>12} {:>12} {:>12} {:>14}",
                        person.person_id,
                        person.main_base,
                        person.extra,
                        person.riders_total(),
                        person.waiver,
                        person.total
                    );
                }
                if let Some(waiver) = quote.waiver.as_ref().filter(|w| w.person_id.is_none()) {
                    println!(
                        "{:<12} {:>14} {:>12} {:>12} {:>12} {:>14}",
                        "other", 0, 0, 0, waiver.premium, waiver.premium
                    );
                }

                let summary = &quote.summary;
                let freq = &quote.frequency;
                println!("\nSummary:");
                println!("  Main premium:   {}", summary.base_main);
                println!("  Extra premium:  {}", summary.extra);
                println!("  Riders:         {}", summary.total_riders);
                println!("  Annual total:   {}", summary.total);
                println!(
                    "  {} x {}: {} (annual equivalent {}, variance {})",
                    freq.periods,
                    freq.frequency.as_str(),
                    freq.per_period,
                    freq.annual_equivalent,
                    freq.variance
                );
                if quote.hospital_cash_cap > 0 {
                    println!(
                        "  Hospital cash:  {}/{} per day allocated",
                        quote.hospital_cash_allocated, quote.hospital_cash_cap
                    );
                }
                let tiers: Vec<_> = quote.available_tiers.iter().map(|t| t.as_str()).collect();
                println!("  Health tiers:   {}", tiers.join(", "));
            }
            Err(e) => {
                let (summary, _) = outcome.summary_or_zero();
                println!("\nCalculation failed: {e}");
                println!("  Annual total:   {}", summary.total);
            }
        }

        if !outcome.validation.is_empty() {
            println!("\nValidation:");
            for problem in &outcome.validation {
                println!("  {}: {}", problem.field, problem.message);
            }
        }
    }

    if let Some(path) = &args.projection_csv {
        let illustration = runner
            .project(&input, reference, args.target_age)
            .context("illustrating premiums")?;
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        illustration.write_csv(file)?;

        let summary = illustration.summary();
        println!(
            "\nIllustration: {} year(s), total {} written to {}",
            summary.years,
            summary.total,
            path.display()
        );
    }

    Ok(())
}
