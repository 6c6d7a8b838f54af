//! Loads a fixture file written by [`crate::writer`] back into records.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::MarginCallError;
use crate::table::RecordTable;
use crate::types::{Currency, MarginCallRecord};
use crate::writer::{DATE_FORMAT, HEADER};
use crate::MarginCallResult;

fn field<'a>(
    row: &'a csv::StringRecord,
    idx: usize,
    line: usize,
    name: &'static str,
) -> MarginCallResult<&'a str> {
    row.get(idx).ok_or(MarginCallError::ParseField {
        row: line,
        field: name,
        raw: String::new(),
    })
}

fn decimal(raw: &str, line: usize, name: &'static str) -> MarginCallResult<Decimal> {
    Decimal::from_str(raw).map_err(|_| MarginCallError::ParseField {
        row: line,
        field: name,
        raw: raw.to_string(),
    })
}

fn parse_row(row: &csv::StringRecord, line: usize) -> MarginCallResult<MarginCallRecord> {
    let raw_date = field(row, 0, line, "Date")?;
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
        MarginCallError::ParseField {
            row: line,
            field: "Date",
            raw: raw_date.to_string(),
        }
    })?;

    let raw_flag = field(row, 9, line, "MarginCallMade")?;
    let margin_call_made = match raw_flag {
        "Yes" => true,
        "No" => false,
        other => {
            return Err(MarginCallError::ParseField {
                row: line,
                field: "MarginCallMade",
                raw: other.to_string(),
            })
        }
    };

    let currency = Currency::new(field(row, 6, line, "Currency")?);

    Ok(MarginCallRecord {
        date,
        client: field(row, 1, line, "Client")?.to_string(),
        mtm: decimal(field(row, 2, line, "MTM")?, line, "MTM")?,
        collateral: decimal(field(row, 3, line, "Collateral")?, line, "Collateral")?,
        threshold: decimal(field(row, 4, line, "Threshold")?, line, "Threshold")?,
        volatility: decimal(field(row, 5, line, "Volatility")?, line, "Volatility")?,
        currency,
        interest_rate: decimal(field(row, 7, line, "InterestRate")?, line, "InterestRate")?,
        mta: decimal(field(row, 8, line, "MTA")?, line, "MTA")?,
        margin_call_made,
        margin_call_amount: decimal(
            field(row, 10, line, "MarginCallAmount")?,
            line,
            "MarginCallAmount",
        )?,
    })
}

/// Parse records from any reader. The header must match exactly; data
/// rows are numbered from 1 in errors.
pub fn parse_records<R: Read>(reader: R) -> MarginCallResult<Vec<MarginCallRecord>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    if !headers.iter().eq(HEADER.iter().copied()) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(MarginCallError::InvalidInput {
            field: "header".into(),
            reason: format!("expected '{}', got '{}'", HEADER.join(","), found.join(",")),
        });
    }

    let mut records = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        records.push(parse_row(&row?, idx + 1)?);
    }
    Ok(records)
}

pub fn read_records(path: impl AsRef<Path>) -> MarginCallResult<Vec<MarginCallRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        MarginCallError::Io(format!("failed to open '{}': {e}", path.display()))
    })?;
    parse_records(file)
}

/// Read a fixture and re-establish table order.
pub fn read_table(path: impl AsRef<Path>) -> MarginCallResult<RecordTable> {
    Ok(RecordTable::from_records(read_records(path)?))
}
