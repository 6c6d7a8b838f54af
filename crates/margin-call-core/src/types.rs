use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values, held in whole currency units once synthesized.
pub type Money = Decimal;

/// Percentages as quoted (4.5 = 4.5%). Never as decimals.
pub type Percent = Decimal;

/// ISO currency code stamped on every record. Defaults to `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A client on the roster and its Minimum Transfer Amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: String,
    pub mta: Money,
}

impl ClientProfile {
    pub fn new(id: impl Into<String>, mta: Money) -> Self {
        Self { id: id.into(), mta }
    }
}

/// One synthesized row, keyed by (date, client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginCallRecord {
    pub date: NaiveDate,
    pub client: String,
    pub mtm: Money,
    pub collateral: Money,
    pub threshold: Money,
    pub volatility: Percent,
    pub currency: Currency,
    pub interest_rate: Percent,
    pub mta: Money,
    pub margin_call_made: bool,
    pub margin_call_amount: Money,
}

impl MarginCallRecord {
    /// True when the flag agrees with `margin_call_amount >= mta`.
    ///
    /// Only rows rewritten by the non-positive-amount fallback can disagree.
    pub fn is_flag_consistent(&self) -> bool {
        self.margin_call_made == (self.margin_call_amount >= self.mta)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64_rounded_to_decimal".to_string(),
        },
    }
}
