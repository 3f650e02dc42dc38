use serde_json::Value;

/// Best human-readable message from a failed response body.
///
/// Preference: a `message` field, then the values of an `errors` map joined
/// by `", "`, then a bare JSON string, then the raw (non-JSON) text. Falls
/// back to `API request failed: <reason>`.
pub fn extract_error_message(body: &str, reason: &str) -> String {
    let fallback = format!("API request failed: {}", reason);

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => {
            let text = body.trim();
            return if text.is_empty() {
                fallback
            } else {
                text.to_string()
            };
        }
    };

    if let Some(message) = value.get("message").and_then(non_empty_text) {
        return message;
    }

    if let Some(errors) = value.get("errors") {
        let joined = match errors {
            Value::Object(map) => join_values(map.values()),
            Value::Array(items) => join_values(items.iter()),
            _ => String::new(),
        };
        return if joined.is_empty() { fallback } else { joined };
    }

    match value {
        Value::String(text) if !text.is_empty() => text,
        _ => fallback,
    }
}

fn join_values<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .filter_map(non_empty_text)
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Null | Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
