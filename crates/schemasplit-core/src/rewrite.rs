use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Component kinds whose references are rewritten to sibling files.
pub const COMPONENT_KINDS: &[&str] = &[
    "callbacks",
    "examples",
    "headers",
    "links",
    "parameters",
    "requestBodies",
    "responses",
    "schemas",
    "securitySchemes",
];

static COMPONENT_REF: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r#"#/components/(?:{})/([^"]+)"#, COMPONENT_KINDS.join("|"));
    Regex::new(&pattern).expect("component reference pattern should be valid")
});

/// Rewrite every `#/components/<kind>/<name>` pointer in a serialized schema
/// to `<name>.json`.
///
/// The last segment of the pointer is used as-is. Pointers to other kinds, or
/// outside `#/components/`, are left alone and will not resolve.
///
/// A match runs to the closing quote of whatever JSON string holds it, so a
/// pointer inside free text such as a `description` swallows the rest of the
/// sentence: `"see #/components/schemas/Owner for details"` becomes
/// `"see Owner for details.json"`.
pub fn rewrite_references(serialized: &str) -> Cow<'_, str> {
    COMPONENT_REF.replace_all(serialized, |caps: &Captures| {
        let target = &caps[1];
        let name = target.rsplit('/').next().unwrap_or(target);
        format!("{name}.json")
    })
}
