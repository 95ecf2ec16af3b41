use std::path::Path;

use serde_json::Value;

use super::{ExtractContext, SkipReason};
use crate::document::{self, Collection};
use crate::error::ExtractError;

/// Write one file per member of each definition collection, into a
/// subdirectory named after the keyword.
///
/// Collections that are arrays in `original` are named from each member's
/// `name` field, falling back to the member at the same index in `original`.
pub fn extract_components(
    ctx: &mut ExtractContext<'_>,
    converted: &Value,
    original: &Value,
    keywords: &[String],
) -> Result<(), ExtractError> {
    for keyword in keywords {
        let Some(value) = document::lookup(converted, keyword) else {
            ctx.skip(keyword.as_str(), SkipReason::MissingCollection);
            continue;
        };
        let subdir = Path::new(keyword);
        // The original document decides whether members are keyed or indexed.
        let shape = document::lookup(original, keyword).unwrap_or(value);

        match (Collection::classify(shape), Collection::classify(value)) {
            (Some(Collection::Named(_)), Some(Collection::Named(members))) => {
                for (name, entry) in members {
                    let location = format!("{keyword}.{name}");
                    ctx.write_schema(subdir, name, entry, &location)?;
                }
            }
            (Some(Collection::Indexed(original_members)), Some(Collection::Indexed(members))) => {
                for (index, entry) in members.iter().enumerate() {
                    let location = format!("{keyword}[{index}]");
                    let declared = declared_name(entry)
                        .or_else(|| original_members.get(index).and_then(declared_name));
                    match declared {
                        Some(name) => ctx.write_schema(subdir, name, entry, &location)?,
                        None => ctx.skip(location, SkipReason::MissingName),
                    }
                }
            }
            _ => ctx.skip(keyword.as_str(), SkipReason::NotACollection),
        }
    }
    Ok(())
}

fn declared_name(entry: &Value) -> Option<&str> {
    entry.get("name").and_then(Value::as_str)
}
