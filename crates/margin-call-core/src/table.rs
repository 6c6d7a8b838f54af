use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{MarginCallRecord, Money};

/// Records ordered by date ascending, then client id ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTable {
    records: Vec<MarginCallRecord>,
}

impl RecordTable {
    /// Takes records in any order and sorts them. The sort is stable, so
    /// duplicate (date, client) keys keep their input order.
    pub fn from_records(mut records: Vec<MarginCallRecord>) -> Self {
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.client.cmp(&b.client)));
        Self { records }
    }

    pub fn records(&self) -> &[MarginCallRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MarginCallRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarginCallRecord> {
        self.records.iter()
    }

    /// True when no (date, client) key appears twice.
    pub fn has_unique_keys(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| (w[0].date, &w[0].client) != (w[1].date, &w[1].client))
    }

    pub fn summary(&self) -> TableSummary {
        let dates: BTreeSet<NaiveDate> = self.records.iter().map(|r| r.date).collect();

        let mut by_client: BTreeMap<&str, ClientAccumulator> = BTreeMap::new();
        for record in &self.records {
            by_client
                .entry(record.client.as_str())
                .or_default()
                .add(record);
        }

        let per_client: Vec<ClientSummary> = by_client
            .into_iter()
            .map(|(client, acc)| acc.finish(client))
            .collect();

        TableSummary {
            record_count: self.records.len(),
            business_day_count: dates.len(),
            client_count: per_client.len(),
            first_date: dates.first().copied(),
            last_date: dates.last().copied(),
            flag_inconsistencies: per_client.iter().map(|c| c.flag_inconsistencies).sum(),
            per_client,
        }
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a MarginCallRecord;
    type IntoIter = std::slice::Iter<'a, MarginCallRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Run-level counts plus a breakdown per client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub record_count: usize,
    pub business_day_count: usize,
    pub client_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Rows whose flag disagrees with `amount >= MTA`.
    pub flag_inconsistencies: usize,
    pub per_client: Vec<ClientSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client: String,
    pub mta: Money,
    pub records: usize,
    pub calls_made: usize,
    pub call_ratio: Decimal,
    pub average_mtm: Money,
    pub total_margin_call_amount: Money,
    pub flag_inconsistencies: usize,
}

#[derive(Default)]
struct ClientAccumulator {
    mta: Money,
    records: usize,
    calls_made: usize,
    total_mtm: Money,
    total_call: Money,
    inconsistencies: usize,
}

impl ClientAccumulator {
    fn add(&mut self, record: &MarginCallRecord) {
        self.mta = record.mta;
        self.records += 1;
        if record.margin_call_made {
            self.calls_made += 1;
        }
        if !record.is_flag_consistent() {
            self.inconsistencies += 1;
        }
        self.total_mtm += record.mtm;
        self.total_call += record.margin_call_amount;
    }

    fn finish(self, client: &str) -> ClientSummary {
        let n = Decimal::from(self.records as u64);
        let (call_ratio, average_mtm) = if n.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (
                (Decimal::from(self.calls_made as u64) / n).round_dp(4),
                (self.total_mtm / n).round_dp(2),
            )
        };
        ClientSummary {
            client: client.to_string(),
            mta: self.mta,
            records: self.records,
            calls_made: self.calls_made,
            call_ratio,
            average_mtm,
            total_margin_call_amount: self.total_call,
            flag_inconsistencies: self.inconsistencies,
        }
    }
}
