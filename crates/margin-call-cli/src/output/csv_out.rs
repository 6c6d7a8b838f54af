use serde_json::Value;
use std::io;

use super::{format_scalar, per_client};

/// Write output as CSV to stdout.
///
/// Reports with a per-client breakdown print one row per client; anything
/// else prints field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(rows) = per_client(value) {
        write_array_csv(&mut wtr, rows);
    } else if let Value::Array(arr) = value {
        write_array_csv(&mut wtr, arr);
    } else if let Some(Value::Object(result)) = value.get("result") {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in result {
            let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
        }
    } else {
        let _ = wtr.write_record([&format_scalar(value)]);
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
