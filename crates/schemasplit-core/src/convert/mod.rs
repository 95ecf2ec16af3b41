pub mod lowering;

use serde_json::Value;

use crate::error::ConvertError;

pub use lowering::JsonSchemaLowering;

/// Options passed to a [`Converter`].
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Dotted paths to collections whose members are schemas.
    pub definition_keywords: Vec<String>,
}

/// Lowers an OpenAPI document into a tree of JSON-Schema-shaped objects,
/// keyed the same way as the input.
pub trait Converter {
    fn convert(&self, document: &Value, options: &ConvertOptions) -> Result<Value, ConvertError>;
}
