use std::fs;
use std::path::Path;

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use serde::Deserialize;

/// Project configuration loaded from `.schemasplit.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Extra definition keywords, merged with `components.schemas`.
    pub definition_keywords: Vec<String>,
    pub naming: NamingConfig,
    pub parameters: ParametersConfig,
}

/// How schema names become file names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Replacement for characters that are not allowed in a path segment.
    pub replacement: char,
    pub case: FileNameCase,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            replacement: '_',
            case: FileNameCase::Preserve,
        }
    }
}

/// Final formatting pass applied to sanitized file names.
///
/// Anything other than `Preserve` can break references, since `$ref` targets
/// are rewritten from the raw component name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNameCase {
    #[default]
    Preserve,
    Snake,
    Kebab,
    LowerCamel,
    Pascal,
}

impl FileNameCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            FileNameCase::Preserve => name.to_string(),
            FileNameCase::Snake => name.to_snake_case(),
            FileNameCase::Kebab => name.to_kebab_case(),
            FileNameCase::LowerCamel => name.to_lower_camel_case(),
            FileNameCase::Pascal => name.to_pascal_case(),
        }
    }
}

/// Parameter schema synthesis options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParametersConfig {
    pub buckets: BucketAssignment,
    /// Follow `$ref` entries into `components.parameters`. Off by default,
    /// in which case a `$ref` entry has no `in` and is left out.
    pub resolve_refs: bool,
}

/// Which bucket a parameter's `in` value lands in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketAssignment {
    /// `in: path` goes to the `query` bucket and `in: query` to the `path`
    /// bucket. Existing consumers rely on these file names.
    #[default]
    Inverted,
    /// Each parameter lands in the bucket named after its location.
    Literal,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".schemasplit.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<SplitConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: SplitConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# schemasplit configuration
definition_keywords: []
  # - components.parameters
  # - components.responses

naming:
  replacement: "_"      # replaces characters that are invalid in file names
  case: preserve        # preserve | snake | kebab | lower_camel | pascal

parameters:
  buckets: inverted     # inverted | literal
  resolve_refs: false   # follow $ref entries into components.parameters
"#
}
