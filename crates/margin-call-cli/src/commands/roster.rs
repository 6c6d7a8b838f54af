use serde_json::Value;

use margin_call_core::config::default_roster;

pub fn run_roster() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(default_roster())?)
}
