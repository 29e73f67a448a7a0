//! Funnel Datagen CLI — write a simulated mobile-app funnel dataset for
//! the dashboard to load.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use funnel_dataset::generator::{self, GeneratorConfig};

#[derive(Parser)]
#[command(name = "funnel-datagen")]
#[command(about = "Simulated campaign funnel data generator")]
#[command(version)]
struct Cli {
    /// Number of event rows to generate
    #[arg(long, default_value_t = 500)]
    rows: usize,

    /// Size of the simulated user pool
    #[arg(long, default_value_t = 120)]
    users: usize,

    /// First date of the simulated span (ISO)
    #[arg(long, default_value = "2025-06-01")]
    start: NaiveDate,

    /// Number of days in the span
    #[arg(long, default_value_t = 60)]
    days: u32,

    /// RNG seed, for reproducible datasets
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Per-impression cost used for the derived CPI column
    #[arg(long, default_value_t = 0.01)]
    unit_cost: f64,

    /// Output CSV path
    #[arg(short, long, default_value = "data/mobile_funnel_data.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = GeneratorConfig {
        rows: cli.rows,
        users: cli.users,
        start: cli.start,
        days: cli.days,
        seed: cli.seed,
        unit_cost: cli.unit_cost,
    };

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create '{}'", parent.display()))?;
        }
    }

    let written = generator::write_csv(&config, &cli.output)
        .with_context(|| format!("failed to write '{}'", cli.output.display()))?;

    println!(
        "Wrote {} rows ({} days from {}, seed {}) to {}",
        written,
        cli.days,
        cli.start,
        cli.seed,
        cli.output.display()
    );

    Ok(())
}
