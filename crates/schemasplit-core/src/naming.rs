use crate::config::{FileNameCase, NamingConfig};

const MAX_SEGMENT_BYTES: usize = 255;

const RESERVED_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Turns schema keys, declared names and synthesized strings into file names.
#[derive(Debug, Clone)]
pub struct NameResolver {
    replacement: char,
    case: FileNameCase,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(&NamingConfig::default())
    }
}

impl NameResolver {
    pub fn new(config: &NamingConfig) -> Self {
        Self {
            replacement: config.replacement,
            case: config.case,
        }
    }

    /// Resolve a raw name to a file name stem. Returns `None` when nothing
    /// usable survives sanitization.
    ///
    /// Distinct names that sanitize to the same stem are not told apart.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let sanitized = sanitize_segment(raw, self.replacement);
        self.finish(raw.starts_with(self.replacement), &sanitized)
    }

    /// Flatten a URL template like `/widgets/{id}` into `widgets_{id}`.
    pub fn flatten_path(&self, path: &str) -> Option<String> {
        let flat: String = path
            .chars()
            .map(|ch| if ch == '/' { self.replacement } else { ch })
            .collect();
        let sanitized = sanitize_segment(&flat, self.replacement);
        self.finish(false, &sanitized)
    }

    fn finish(&self, keep_leading: bool, sanitized: &str) -> Option<String> {
        let trimmed = if keep_leading {
            sanitized
        } else {
            sanitized
                .strip_prefix(self.replacement)
                .unwrap_or(sanitized)
        };
        let formatted = self.case.apply(trimmed);
        if formatted.is_empty() {
            None
        } else {
            Some(formatted)
        }
    }
}

/// Make a string safe to use as a single path segment.
///
/// Path separators, characters reserved on Windows, and control characters are
/// replaced. Relative names (`.`, `..`) and reserved device names are replaced
/// wholesale, and trailing dots and spaces are replaced.
pub fn sanitize_segment(raw: &str, replacement: char) -> String {
    let mut result: String = raw
        .chars()
        .map(|ch| if is_invalid_char(ch) { replacement } else { ch })
        .collect();

    if (!result.is_empty() && result.chars().all(|ch| ch == '.')) || is_reserved_device(&result) {
        return replacement.to_string();
    }

    let kept = result.trim_end_matches(['.', ' ']).len();
    if kept < result.len() {
        let trailing = result[kept..].chars().count();
        result.truncate(kept);
        result.extend(std::iter::repeat_n(replacement, trailing));
    }

    truncate_to_boundary(&mut result, MAX_SEGMENT_BYTES);
    result
}

fn is_invalid_char(ch: char) -> bool {
    matches!(ch, '/' | '\\' | '?' | '<' | '>' | ':' | '*' | '|' | '"') || ch.is_control()
}

fn is_reserved_device(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    RESERVED_DEVICE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
}

fn truncate_to_boundary(value: &mut String, max_bytes: usize) {
    if value.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
}
