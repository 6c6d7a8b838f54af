use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;
use tracing::debug;

use margin_call_core::config::GeneratorConfig;
use margin_call_core::generator;

use crate::input;

/// Arguments for fixture generation
#[derive(Args)]
pub struct GenerateArgs {
    /// Path to JSON config file (flags below override its fields)
    #[arg(long)]
    pub config: Option<String>,

    /// Last date of the window, YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Number of business days in the window
    #[arg(long, alias = "business-days")]
    pub days: Option<usize>,

    /// Added to every per-cell random seed
    #[arg(long)]
    pub seed_basis: Option<u64>,

    /// Destination file (overwritten if it exists)
    #[arg(long, default_value = "MarginCallData.csv")]
    pub out: String,
}

fn build_config(args: &GenerateArgs) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config: GeneratorConfig = match args.config {
        Some(ref path) => input::file::read_json(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(end_date) = args.end_date {
        config.end_date = end_date;
    }
    if let Some(days) = args.days {
        config.business_days = days;
    }
    if let Some(seed_basis) = args.seed_basis {
        config.seed_basis = seed_basis;
    }

    debug!(
        end_date = %config.end_date,
        business_days = config.business_days,
        clients = config.roster.len(),
        seed_basis = config.seed_basis,
        "resolved generator config"
    );
    Ok(config)
}

pub fn run_generate(args: GenerateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    let result = generator::generate_to_file(&config, &args.out)?;
    Ok(serde_json::to_value(result)?)
}
