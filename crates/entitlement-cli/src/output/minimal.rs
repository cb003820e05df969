use serde_json::Value;

/// Key figures, most specific first: a tax credit, an allocated amount,
/// a schedule total, then a plain total.
const PRIORITY_KEYS: [&str; 5] = ["credit", "amount", "allocated_total", "total", "total_entitlement"];

/// Name fields used to label the lines of a list result.
const LABEL_KEYS: [&str; 3] = ["subsidy", "label", "project_id"];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object. List results
/// print one labelled line per item.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(_) => println!("{}", key_figure(result_obj)),
        Value::Array(items) => {
            for item in items {
                match label(item) {
                    Some(name) => println!("{}: {}", name, key_figure(item)),
                    None => println!("{}", key_figure(item)),
                }
            }
        }
        _ => println!("{}", format_minimal(result_obj)),
    }
}

fn key_figure(value: &Value) -> String {
    if let Value::Object(map) = value {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }
    format_minimal(value)
}

fn label(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    LABEL_KEYS
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credit_wins_over_total() {
        let value = json!({"base": "100", "credit": "30", "total": "5"});
        assert_eq!(key_figure(&value), "30");
    }

    #[test]
    fn test_amount_before_entitlement() {
        let value = json!({"subsidy": "regional", "total_entitlement": "6000", "amount": "1000"});
        assert_eq!(key_figure(&value), "1000");
        assert_eq!(label(&value).as_deref(), Some("regional"));
    }

    #[test]
    fn test_fallback_to_first_field() {
        let value = json!({"year": 2024});
        assert_eq!(key_figure(&value), "year: 2024");
    }
}
