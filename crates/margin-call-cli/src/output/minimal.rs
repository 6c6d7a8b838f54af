use serde_json::Value;

use super::format_scalar;

/// Print just the key answer value from the output.
///
/// Looks for well-known report fields in priority order, descending into a
/// nested `summary` object, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = ["output_path", "record_count"];

    if let Value::Object(map) = result_obj {
        let nested = map.get("summary").and_then(Value::as_object);
        for key in &priority_keys {
            let found = map.get(*key).or_else(|| nested.and_then(|s| s.get(*key)));
            if let Some(val) = found {
                if !val.is_null() {
                    println!("{}", format_scalar(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    if let Value::Array(arr) = result_obj {
        println!("{}", arr.len());
        return;
    }

    println!("{}", format_scalar(result_obj));
}
