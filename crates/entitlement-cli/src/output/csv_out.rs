use serde_json::Value;
use std::io;

use super::{flatten_row, split_result};

/// Write output as CSV to stdout.
///
/// Scalar fields come first as field/value pairs. Each array of records
/// (monthly lines, per-year detail) follows under a one-cell row naming it,
/// with its own header row.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());
    write_result_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_result_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            let (scalars, tables) = split_result(map);
            if !scalars.is_empty() {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in &scalars {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
            for (name, rows) in &tables {
                let _ = wtr.write_record([name.as_str()]);
                write_array_csv(wtr, rows);
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(result)]);
        }
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if !arr.iter().any(Value::is_object) {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    }

    let rows: Vec<Vec<(String, Value)>> = arr.iter().map(flatten_row).collect();
    let mut headers: Vec<String> = Vec::new();
    for row in &rows {
        for (key, _) in row {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let _ = wtr.write_record(&headers);
    for row in &rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| format_csv_value(v))
                    .unwrap_or_default()
            })
            .collect();
        let _ = wtr.write_record(&record);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) if !arr.iter().any(Value::is_object) => {
            let items: Vec<String> = arr.iter().map(format_csv_value).collect();
            items.join(" ")
        }
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
