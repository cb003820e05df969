pub mod csv_out;
pub mod minimal;
pub mod table;

use colored::Colorize;
use serde_json::{Map, Value};

use crate::OutputFormat;

/// Dotted scalar fields of a result.
pub(crate) type Rows = Vec<(String, Value)>;
/// Named arrays of objects found in a result.
pub(crate) type Tables = Vec<(String, Vec<Value>)>;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{}: {}", "error".red().bold(), e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split a result object into dotted scalar rows and its arrays of objects
/// (monthly lines, per-year detail), which the formatters lay out separately.
pub(crate) fn split_result(map: &Map<String, Value>) -> (Rows, Tables) {
    let mut scalars = Vec::new();
    let mut tables = Vec::new();
    flatten_into("", map, &mut scalars, &mut tables);
    (scalars, tables)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    scalars: &mut Rows,
    tables: &mut Tables,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, scalars, tables),
            Value::Array(items) if items.iter().any(Value::is_object) => {
                tables.push((name, items.clone()));
            }
            _ => scalars.push((name, val.clone())),
        }
    }
}

/// Flatten one row object to dotted keys, for array layouts.
pub(crate) fn flatten_row(value: &Value) -> Rows {
    match value {
        Value::Object(map) => {
            let (mut scalars, nested) = split_result(map);
            for (name, items) in nested {
                scalars.push((name, Value::Array(items)));
            }
            scalars
        }
        other => vec![(String::new(), other.clone())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_result_flattens_and_extracts_tables() {
        let value = json!({
            "total": "1000",
            "period": {"kind": "year", "year": 2024},
            "months": [{"month": "01/2024", "amount": "10"}],
            "active_months": [1, 2, 3]
        });
        let (scalars, tables) = split_result(value.as_object().unwrap());
        let names: Vec<&str> = scalars.iter().map(|(k, _)| k.as_str()).collect();
        assert!(names.contains(&"period.kind"));
        assert!(names.contains(&"active_months"));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].0, "months");
    }
}
