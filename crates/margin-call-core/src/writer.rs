//! Delimited-text serialization of a [`RecordTable`].
//!
//! Column contract, in order:
//!
//! | Column             | Example        |
//! |--------------------|----------------|
//! | `Date`             | `29-May-2025`  |
//! | `Client`           | `ClientA`      |
//! | `MTM`              | `4712345`      |
//! | `Collateral`       | `3120000`      |
//! | `Threshold`        | `1450000`      |
//! | `Volatility`       | `21`           |
//! | `Currency`         | `USD`          |
//! | `InterestRate`     | `4.6`          |
//! | `MTA`              | `100000`       |
//! | `MarginCallMade`   | `Yes` / `No`   |
//! | `MarginCallAmount` | `123456`       |

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::MarginCallError;
use crate::table::RecordTable;
use crate::types::MarginCallRecord;
use crate::MarginCallResult;

pub const HEADER: [&str; 11] = [
    "Date",
    "Client",
    "MTM",
    "Collateral",
    "Threshold",
    "Volatility",
    "Currency",
    "InterestRate",
    "MTA",
    "MarginCallMade",
    "MarginCallAmount",
];

/// `dd-MMM-yyyy` with English month abbreviations.
pub const DATE_FORMAT: &str = "%d-%b-%Y";

fn plain(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn flag_text(made: bool) -> &'static str {
    if made {
        "Yes"
    } else {
        "No"
    }
}

fn to_row(record: &MarginCallRecord) -> [String; 11] {
    [
        record.date.format(DATE_FORMAT).to_string(),
        record.client.clone(),
        plain(record.mtm),
        plain(record.collateral),
        plain(record.threshold),
        plain(record.volatility),
        record.currency.to_string(),
        format!("{:.1}", record.interest_rate),
        plain(record.mta),
        flag_text(record.margin_call_made).to_string(),
        plain(record.margin_call_amount),
    ]
}

/// Write the header and one line per record, in table order.
pub fn write_records<W: Write>(table: &RecordTable, writer: W) -> MarginCallResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for record in table {
        wtr.write_record(to_row(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create or truncate `path` and write the table to it.
pub fn write_table(table: &RecordTable, path: impl AsRef<Path>) -> MarginCallResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        MarginCallError::Io(format!("failed to create '{}': {e}", path.display()))
    })?;
    write_records(table, BufWriter::new(file))
}
