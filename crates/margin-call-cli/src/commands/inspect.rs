use clap::Args;
use serde_json::Value;

use margin_call_core::generator;

/// Arguments for summarizing an existing fixture
#[derive(Args)]
pub struct InspectArgs {
    /// Path to a file written by `generate`
    #[arg(long)]
    pub file: String,
}

pub fn run_inspect(args: InspectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = generator::inspect_file(&args.file)?;
    Ok(serde_json::to_value(result)?)
}
