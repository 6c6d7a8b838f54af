use std::f64::consts::PI;

use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::allocation::{allocate, round_whole, Allocation, AllocationBranch};
use crate::calendar::BusinessCalendar;
use crate::config::{GeneratorConfig, RateRange};
use crate::random::{stable_hash, CellStream, DeterministicRandomSource};
use crate::table::RecordTable;
use crate::types::{ClientProfile, MarginCallRecord, Money, Percent};
use crate::MarginCallResult;

const BASE_VALUE: f64 = 3_000_000.0;
const BUCKET_STEP_VALUE: f64 = 800_000.0;
const CLIENT_BUCKETS: i32 = 6;
const MTM_FLOOR: f64 = 1_000_000.0;
const BASE_VOLATILITY: f64 = 15.0;
const BUCKET_STEP_VOLATILITY: f64 = 3.0;
const RATE_FLOOR: Decimal = dec!(0.1);
const FALLBACK_CALL_BASE: f64 = 100_000.0;

/// Seasonal drift across the window: one full sine cycle, centred on 0.1.
pub fn trend_factor(day_factor: f64) -> f64 {
    (day_factor * 2.0 * PI).sin() * 0.2 + 0.1
}

/// Stable per-client bucket in `-5..=5` that shifts value and volatility.
///
/// The hash is read as a signed 32-bit integer and the remainder keeps the
/// dividend's sign, so negative buckets pull the base value down far enough
/// for the MTM floor to bind.
pub fn client_bucket(client: &str) -> i32 {
    (stable_hash(client) as i32) % CLIENT_BUCKETS
}

fn whole(x: f64) -> Money {
    Decimal::from(round_whole(x) as i64)
}

/// Market-side values for one cell, before any allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
    pub mtm: f64,
    pub volatility: f64,
    pub interest_rate: Percent,
}

impl MarketInputs {
    /// Consumes four draws: base value, random factor, volatility bump,
    /// rate blend.
    pub fn derive(
        client: &str,
        day_factor: f64,
        rate_range: RateRange,
        stream: &mut CellStream,
    ) -> Self {
        let bucket = f64::from(client_bucket(client));
        let trend = trend_factor(day_factor);

        let base_value =
            BASE_VALUE + bucket * BUCKET_STEP_VALUE + stream.next_int(100_000, 500_000) as f64;
        let random_factor = 0.05 + stream.next_uniform() * 0.15;
        let mtm = round_whole((base_value * (1.0 + trend + random_factor)).max(MTM_FLOOR));

        let volatility = round_whole(
            BASE_VOLATILITY
                + bucket * BUCKET_STEP_VOLATILITY
                + trend * 10.0
                + stream.next_int(1, 5) as f64,
        );

        let blend = 0.5 + trend * 0.3 + stream.next_uniform() * 0.2;
        let raw_rate = rate_range.min + rate_range.width() * blend;
        let interest_rate = Decimal::from_f64(raw_rate)
            .unwrap_or(RATE_FLOOR)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
            .max(RATE_FLOOR);

        Self {
            mtm,
            volatility,
            interest_rate,
        }
    }
}

/// The call amount and flag after all corrections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub margin_call_made: bool,
    pub margin_call_amount: f64,
    /// The amount was non-positive and replaced by a random positive value.
    pub fallback_applied: bool,
}

/// Computes the call amount, sets the flag, then applies the
/// non-positive-amount fallback.
///
/// The flag is decided before the fallback and is not revisited, so a
/// fallback row can read `No` with an amount at or above MTA.
pub fn settle(
    mtm: f64,
    mta: f64,
    collateral: f64,
    threshold: f64,
    stream: &mut CellStream,
) -> Settlement {
    let amount = mtm - collateral - threshold;
    let margin_call_made = amount >= mta;

    if amount <= 0.0 {
        return Settlement {
            margin_call_made,
            margin_call_amount: FALLBACK_CALL_BASE + stream.next_int(10_000, 50_000) as f64,
            fallback_applied: true,
        };
    }

    Settlement {
        margin_call_made,
        margin_call_amount: amount,
        fallback_applied: false,
    }
}

/// A synthesized record plus how the policy arrived at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellOutcome {
    pub record: MarginCallRecord,
    pub allocation: Allocation,
    pub fallback_applied: bool,
}

/// Produces one record per (business day, client) cell.
#[derive(Debug, Clone)]
pub struct RecordSynthesizer {
    config: GeneratorConfig,
    calendar: BusinessCalendar,
    source: DeterministicRandomSource,
}

impl RecordSynthesizer {
    /// Validates `config` and builds the calendar up front, so every
    /// configuration error surfaces before any cell is synthesized.
    pub fn new(config: GeneratorConfig) -> MarginCallResult<Self> {
        config.validate()?;
        let calendar = BusinessCalendar::ending(config.end_date, config.business_days)?;
        let source = DeterministicRandomSource::new(config.seed_basis);
        Ok(Self {
            config,
            calendar,
            source,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Synthesizes a single cell. Pure in its arguments and the config.
    pub fn synthesize_cell(
        &self,
        day_index: usize,
        date: NaiveDate,
        client: &ClientProfile,
    ) -> CellOutcome {
        let mut stream = self.source.stream_for(&client.id, date);
        let day_factor = self.calendar.day_factor(day_index);
        let mta = client.mta.to_f64().unwrap_or_default();

        let market = MarketInputs::derive(
            &client.id,
            day_factor,
            self.config.interest_rate_range,
            &mut stream,
        );

        let branch = AllocationBranch::draw(&mut stream);
        let allocation = allocate(market.mtm, mta, branch, &mut stream);
        if allocation.corrected {
            debug!(
                client = %client.id,
                %date,
                ?branch,
                collateral = allocation.collateral,
                "collateral re-derived after call landed outside branch band"
            );
        }

        let settlement = settle(
            market.mtm,
            mta,
            allocation.collateral,
            allocation.threshold,
            &mut stream,
        );
        if settlement.fallback_applied {
            debug!(
                client = %client.id,
                %date,
                amount = settlement.margin_call_amount,
                made = settlement.margin_call_made,
                "non-positive call amount replaced by fallback; flag left as computed"
            );
        }

        let record = MarginCallRecord {
            date,
            client: client.id.clone(),
            mtm: whole(market.mtm),
            collateral: whole(allocation.collateral),
            threshold: whole(allocation.threshold),
            volatility: whole(market.volatility),
            currency: self.config.currency.clone(),
            interest_rate: market.interest_rate,
            mta: client.mta,
            margin_call_made: settlement.margin_call_made,
            margin_call_amount: whole(settlement.margin_call_amount),
        };

        CellOutcome {
            record,
            allocation,
            fallback_applied: settlement.fallback_applied,
        }
    }

    /// Day-major, client-minor over the whole window, then ordered by
    /// (date, client).
    pub fn synthesize(&self) -> RecordTable {
        let mut records = Vec::with_capacity(self.calendar.len() * self.config.roster.len());
        for (day_index, date) in self.calendar.days().iter().enumerate() {
            for client in &self.config.roster {
                records.push(self.synthesize_cell(day_index, *date, client).record);
            }
        }
        RecordTable::from_records(records)
    }
}
