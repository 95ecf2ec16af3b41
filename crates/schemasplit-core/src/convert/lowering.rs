use serde_json::{Map, Value, json};

use super::{ConvertOptions, Converter};
use crate::error::ConvertError;

/// Dialect marker added to every lowered definition.
pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

/// OpenAPI-only keywords with no JSON Schema counterpart.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "discriminator",
    "xml",
    "externalDocs",
    "example",
    "deprecated",
];

const VALID_TYPES: &[&str] = &[
    "string", "number", "integer", "boolean", "array", "object", "null",
];

/// Default [`Converter`]: lowers OpenAPI schema objects to draft-04 JSON Schema.
///
/// Members of every definition collection are lowered, as is every object
/// found under a `schema` key (parameters, media types, headers). Members
/// that are not objects pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaLowering;

impl Converter for JsonSchemaLowering {
    fn convert(&self, document: &Value, options: &ConvertOptions) -> Result<Value, ConvertError> {
        let keywords: Vec<Vec<&str>> = options
            .definition_keywords
            .iter()
            .map(|keyword| keyword.split('.').collect())
            .collect();
        let mut tree = document.clone();
        let mut walker = Walker {
            keywords: &keywords,
            path: Vec::new(),
        };
        walker.walk_document(&mut tree)?;
        Ok(tree)
    }
}

struct Walker<'a> {
    keywords: &'a [Vec<&'a str>],
    /// Segments from the document root to the node being visited.
    path: Vec<String>,
}

impl Walker<'_> {
    fn walk_document(&mut self, node: &mut Value) -> Result<(), ConvertError> {
        match node {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    self.path.push(key.clone());
                    let result = if self.at_definition_collection() {
                        self.lower_collection(child)
                    } else if key == "schema" && child.is_object() {
                        self.lower_schema(child)
                    } else {
                        self.walk_document(child)
                    };
                    self.path.pop();
                    result?;
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter_mut().enumerate() {
                    self.path.push(index.to_string());
                    let result = self.walk_document(child);
                    self.path.pop();
                    result?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn at_definition_collection(&self) -> bool {
        self.keywords.iter().any(|keyword| {
            keyword
                .iter()
                .copied()
                .eq(self.path.iter().map(String::as_str))
        })
    }

    fn lower_collection(&mut self, collection: &mut Value) -> Result<(), ConvertError> {
        match collection {
            Value::Object(members) => {
                for (name, member) in members.iter_mut() {
                    self.path.push(name.clone());
                    let result = self.lower_definition(member);
                    self.path.pop();
                    result?;
                }
            }
            Value::Array(members) => {
                for (index, member) in members.iter_mut().enumerate() {
                    self.path.push(index.to_string());
                    let result = self.lower_definition(member);
                    self.path.pop();
                    result?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn lower_definition(&mut self, member: &mut Value) -> Result<(), ConvertError> {
        if !member.is_object() {
            return Ok(());
        }
        self.lower_schema(member)?;
        // Definitions such as parameter objects carry their own `schema`.
        self.walk_document(member)?;
        if let Value::Object(definition) = member {
            definition.insert("$schema".to_string(), json!(DRAFT_04));
        }
        Ok(())
    }

    fn lower_schema(&mut self, node: &mut Value) -> Result<(), ConvertError> {
        let Value::Object(schema) = node else {
            return Ok(());
        };

        self.check_type(schema)?;
        if schema.shift_remove("nullable").and_then(|v| v.as_bool()) == Some(true) {
            add_null(schema);
        }
        for keyword in UNSUPPORTED_KEYWORDS {
            schema.shift_remove(*keyword);
        }

        for (key, child) in schema.iter_mut() {
            self.path.push(key.clone());
            let result = match key.as_str() {
                "properties" | "patternProperties" | "definitions" | "$defs" => {
                    self.lower_schema_map(child)
                }
                "allOf" | "anyOf" | "oneOf" => self.lower_schema_list(child),
                "items" if child.is_array() => self.lower_schema_list(child),
                "items" | "not" | "additionalProperties" => self.lower_schema(child),
                _ => Ok(()),
            };
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn lower_schema_map(&mut self, node: &mut Value) -> Result<(), ConvertError> {
        if let Value::Object(members) = node {
            for (name, member) in members.iter_mut() {
                self.path.push(name.clone());
                let result = self.lower_schema(member);
                self.path.pop();
                result?;
            }
        }
        Ok(())
    }

    fn lower_schema_list(&mut self, node: &mut Value) -> Result<(), ConvertError> {
        if let Value::Array(members) = node {
            for (index, member) in members.iter_mut().enumerate() {
                self.path.push(index.to_string());
                let result = self.lower_schema(member);
                self.path.pop();
                result?;
            }
        }
        Ok(())
    }

    fn check_type(&self, schema: &Map<String, Value>) -> Result<(), ConvertError> {
        let Some(ty) = schema.get("type") else {
            return Ok(());
        };
        let valid = match ty {
            Value::String(name) => VALID_TYPES.contains(&name.as_str()),
            Value::Array(names) => names
                .iter()
                .all(|name| name.as_str().is_some_and(|n| VALID_TYPES.contains(&n))),
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(ConvertError::InvalidType {
                pointer: format!("{}/type", self.pointer()),
                found: ty.to_string(),
            })
        }
    }

    /// JSON pointer of the node being visited.
    fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
            .collect()
    }
}

/// Turn `nullable: true` into a `null` member of `type` and `enum`.
fn add_null(schema: &mut Map<String, Value>) {
    let widened = match schema.get_mut("type") {
        Some(Value::String(single)) => Some(json!([single.clone(), "null"])),
        Some(Value::Array(types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push(json!("null"));
            }
            None
        }
        _ => None,
    };
    if let Some(types) = widened {
        schema.insert("type".to_string(), types);
    }

    if let Some(Value::Array(values)) = schema.get_mut("enum") {
        if !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
    }
}
