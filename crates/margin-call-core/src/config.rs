use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MarginCallError;
use crate::types::{ClientProfile, Currency};
use crate::MarginCallResult;

pub const DEFAULT_BUSINESS_DAYS: usize = 180;

/// Interest-rate band, in percent, that the synthesized rate blends across.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    pub min: f64,
    pub max: f64,
}

impl Default for RateRange {
    fn default() -> Self {
        Self { min: 3.0, max: 6.0 }
    }
}

impl RateRange {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Everything a generation run depends on. Two runs with equal configs
/// produce byte-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
    #[serde(default = "default_business_days")]
    pub business_days: usize,
    #[serde(default = "default_roster")]
    pub roster: Vec<ClientProfile>,
    #[serde(default)]
    pub interest_rate_range: RateRange,
    /// Added to every per-cell seed.
    #[serde(default)]
    pub seed_basis: u64,
    #[serde(default)]
    pub currency: Currency,
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 29).unwrap_or_default()
}

fn default_business_days() -> usize {
    DEFAULT_BUSINESS_DAYS
}

/// The six-client roster used for the standard fixture.
pub fn default_roster() -> Vec<ClientProfile> {
    vec![
        ClientProfile::new("ClientA", dec!(100_000)),
        ClientProfile::new("ClientB", dec!(200_000)),
        ClientProfile::new("ClientC", dec!(150_000)),
        ClientProfile::new("ClientD", dec!(80_000)),
        ClientProfile::new("ClientE", dec!(1_200_000)),
        ClientProfile::new("ClientF", dec!(2_500_000)),
    ]
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            end_date: default_end_date(),
            business_days: DEFAULT_BUSINESS_DAYS,
            roster: default_roster(),
            interest_rate_range: RateRange::default(),
            seed_basis: 0,
            currency: Currency::default(),
        }
    }
}

impl GeneratorConfig {
    /// Reject configurations that cannot produce a meaningful table.
    pub fn validate(&self) -> MarginCallResult<()> {
        if self.business_days == 0 {
            return Err(MarginCallError::InvalidInput {
                field: "business_days".into(),
                reason: "must be at least 1".into(),
            });
        }

        if self.roster.is_empty() {
            return Err(MarginCallError::InvalidInput {
                field: "roster".into(),
                reason: "at least one client is required".into(),
            });
        }

        let mut seen = HashSet::with_capacity(self.roster.len());
        for client in &self.roster {
            if client.id.trim().is_empty() {
                return Err(MarginCallError::InvalidInput {
                    field: "roster.id".into(),
                    reason: "client id must not be blank".into(),
                });
            }
            if client.mta <= Decimal::ZERO {
                return Err(MarginCallError::InvalidInput {
                    field: format!("roster.{}.mta", client.id),
                    reason: format!("MTA must be positive, got {}", client.mta),
                });
            }
            if !client.mta.fract().is_zero() {
                return Err(MarginCallError::InvalidInput {
                    field: format!("roster.{}.mta", client.id),
                    reason: format!("MTA must be in whole currency units, got {}", client.mta),
                });
            }
            if !seen.insert(client.id.as_str()) {
                return Err(MarginCallError::DuplicateClient(client.id.clone()));
            }
        }

        let range = self.interest_rate_range;
        if !range.min.is_finite() || !range.max.is_finite() || range.min < 0.0 {
            return Err(MarginCallError::InvalidInput {
                field: "interest_rate_range".into(),
                reason: "bounds must be finite and non-negative".into(),
            });
        }
        if range.min > range.max {
            return Err(MarginCallError::InvalidInput {
                field: "interest_rate_range".into(),
                reason: format!("min {} exceeds max {}", range.min, range.max),
            });
        }

        Ok(())
    }
}
