use serde_json::{Map, Value, json};

use crate::error::ExtractError;
use crate::rewrite::rewrite_references;

/// Keys replaced or dropped when a schema is adapted.
const MANAGED_KEYS: &[&str] = &["$schema", "$id", "title", "tsType"];

/// Build the standalone form of a schema entry: `$id` and `title` first, the
/// body without its `$schema` marker, and a `tsType` hint for date formats.
pub fn adapt_schema(
    entry: &Value,
    name: &str,
    file_name: &str,
    location: &str,
) -> Result<Value, ExtractError> {
    let Value::Object(body) = entry else {
        return Err(ExtractError::NotAnObject {
            location: location.to_string(),
        });
    };

    let mut adapted = Map::new();
    adapted.insert("$id".to_string(), json!(format!("{file_name}.json")));
    adapted.insert("title".to_string(), json!(name));
    for (key, value) in body {
        if !MANAGED_KEYS.contains(&key.as_str()) {
            adapted.insert(key.clone(), value.clone());
        }
    }
    if is_date_format(body) {
        adapted.insert("tsType".to_string(), json!("Date"));
    }
    Ok(Value::Object(adapted))
}

fn is_date_format(body: &Map<String, Value>) -> bool {
    body.get("format")
        .and_then(Value::as_str)
        .is_some_and(|format| format.contains("date"))
}

/// Serialize with 2-space indentation and point component references at
/// sibling files.
pub fn finalize(schema: &Value, location: &str) -> Result<String, ExtractError> {
    let serialized =
        serde_json::to_string_pretty(schema).map_err(|source| ExtractError::Serialize {
            location: location.to_string(),
            source,
        })?;
    Ok(rewrite_references(&serialized).into_owned())
}
