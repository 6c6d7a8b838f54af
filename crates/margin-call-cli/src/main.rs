mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::generate::GenerateArgs;
use commands::inspect::InspectArgs;

/// Reproducible synthetic margin-call fixtures
#[derive(Parser)]
#[command(
    name = "mcgen",
    version,
    about = "Reproducible synthetic margin-call fixtures",
    long_about = "Generates a deterministic table of daily collateral margin-call records \
                  for a roster of clients over a trailing window of business days, and \
                  writes it as a comma-separated file for downstream pipelines."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for the run report
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a margin-call fixture file
    Generate(GenerateArgs),
    /// Summarize an existing fixture file
    Inspect(InspectArgs),
    /// Show the default client roster
    Roster,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Generate(args) => commands::generate::run_generate(args),
        Commands::Inspect(args) => commands::inspect::run_inspect(args),
        Commands::Roster => commands::roster::run_roster(),
        Commands::Version => {
            println!("mcgen {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
