use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use super::{ExtractContext, SkipReason};
use crate::config::BucketAssignment;
use crate::error::ExtractError;

const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// Folder and stem for a path that sanitizes to nothing, such as `/`.
pub const ROOT_PATH_NAME: &str = "root";

/// HTTP methods whose `parameters` produce schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }
}

/// What a key under a path entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKey {
    Operation(HttpMethod),
    /// Path-level `parameters`, shared by every operation.
    Parameters,
    Other,
}

impl PathKey {
    pub fn classify(key: &str) -> Self {
        match key {
            "parameters" => PathKey::Parameters,
            _ => HttpMethod::parse(key).map_or(PathKey::Other, PathKey::Operation),
        }
    }
}

/// Named group of parameters that becomes one synthetic schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Query,
    Path,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Query => "query",
            Bucket::Path => "path",
        }
    }

    /// Bucket for a parameter's `in` value. Header and cookie parameters
    /// have none.
    pub fn for_location(location: &str, assignment: BucketAssignment) -> Option<Self> {
        match (location, assignment) {
            ("path", BucketAssignment::Inverted) | ("query", BucketAssignment::Literal) => {
                Some(Bucket::Query)
            }
            ("query", BucketAssignment::Inverted) | ("path", BucketAssignment::Literal) => {
                Some(Bucket::Path)
            }
            _ => None,
        }
    }
}

/// Synthesize parameter schemas for every path entry.
///
/// Path-level lists are written to `<path folder>/`, operation-level lists
/// to `<path folder>/<method>/`. Both are named
/// `<flattened path>_<bucket>_parameters`. The root path `/` uses
/// [`ROOT_PATH_NAME`] for both.
pub fn extract_paths(ctx: &mut ExtractContext<'_>, converted: &Value) -> Result<(), ExtractError> {
    let Some(paths) = converted.get("paths") else {
        return Ok(());
    };
    let Value::Object(paths) = paths else {
        ctx.skip("paths", SkipReason::NotACollection);
        return Ok(());
    };
    let shared = if ctx.resolve_refs() {
        converted
            .get("components")
            .and_then(|c| c.get("parameters"))
            .and_then(Value::as_object)
    } else {
        None
    };

    for (path, item) in paths {
        let Value::Object(item) = item else {
            ctx.skip(format!("paths.{path}"), SkipReason::NotACollection);
            continue;
        };
        let resolver = ctx.resolver();
        let folder = resolver
            .resolve(path)
            .unwrap_or_else(|| ROOT_PATH_NAME.to_string());
        let stem = resolver
            .flatten_path(path)
            .unwrap_or_else(|| ROOT_PATH_NAME.to_string());

        for (key, value) in item {
            let location = format!("paths.{path}.{key}");
            match PathKey::classify(key) {
                PathKey::Operation(method) => {
                    let Some(parameters) = value.get("parameters") else {
                        continue;
                    };
                    let dir = Path::new(&folder).join(method.as_str());
                    let location = format!("{location}.parameters");
                    emit_parameter_schemas(ctx, shared, parameters, &dir, &stem, &location)?;
                }
                PathKey::Parameters => {
                    let dir = PathBuf::from(&folder);
                    emit_parameter_schemas(ctx, shared, value, &dir, &stem, &location)?;
                }
                PathKey::Other => {}
            }
        }
    }
    Ok(())
}

fn emit_parameter_schemas(
    ctx: &mut ExtractContext<'_>,
    shared: Option<&Map<String, Value>>,
    parameters: &Value,
    dir: &Path,
    stem: &str,
    location: &str,
) -> Result<(), ExtractError> {
    let Value::Array(parameters) = parameters else {
        ctx.skip(location, SkipReason::NotACollection);
        return Ok(());
    };

    let mut buckets: IndexMap<Bucket, Vec<&Value>> =
        IndexMap::from([(Bucket::Query, Vec::new()), (Bucket::Path, Vec::new())]);

    for (index, parameter) in parameters.iter().enumerate() {
        let param_location = format!("{location}[{index}]");
        let parameter = match resolve_parameter(parameter, shared) {
            Ok(parameter) => parameter,
            Err(reason) => {
                ctx.skip(param_location, reason);
                continue;
            }
        };
        if parameter.get("name").and_then(Value::as_str).is_none() {
            ctx.skip(param_location, SkipReason::MissingParameterName);
            continue;
        }
        let location_in = parameter.get("in").and_then(Value::as_str).unwrap_or_default();
        match Bucket::for_location(location_in, ctx.buckets()) {
            Some(bucket) => buckets.entry(bucket).or_default().push(parameter),
            None => ctx.skip(
                param_location,
                SkipReason::UnsupportedLocation(location_in.to_string()),
            ),
        }
    }

    for (bucket, members) in &buckets {
        if members.is_empty() {
            continue;
        }
        let name = format!("{stem}_{}_parameters", bucket.as_str());
        let schema = parameter_schema(members);
        ctx.write_schema(dir, &name, &schema, location)?;
    }
    Ok(())
}

/// Follow a `$ref` into `components.parameters`. Inline parameters are
/// returned as-is; with no `shared` collection every `$ref` is unresolved.
fn resolve_parameter<'a>(
    parameter: &'a Value,
    shared: Option<&'a Map<String, Value>>,
) -> Result<&'a Value, SkipReason> {
    let Some(target) = parameter.get("$ref").and_then(Value::as_str) else {
        return Ok(parameter);
    };
    target
        .strip_prefix(PARAMETER_REF_PREFIX)
        .and_then(|name| shared?.get(name))
        .ok_or_else(|| SkipReason::UnresolvedParameterRef(target.to_string()))
}

/// Build an object schema whose properties are the given parameters.
///
/// `required` is left out entirely when no parameter is required.
fn parameter_schema(parameters: &[&Value]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for parameter in parameters {
        let Some(name) = parameter.get("name").and_then(Value::as_str) else {
            continue;
        };
        let mut schema = parameter.get("schema").cloned().unwrap_or_else(|| json!({}));
        if let (Value::Object(schema), Some(description)) = (&mut schema, parameter.get("description")) {
            schema
                .entry("description")
                .or_insert_with(|| description.clone());
        }
        if parameter.get("required").and_then(Value::as_bool) == Some(true) {
            required.push(json!(name));
        }
        properties.insert(name.to_string(), schema);
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema.insert("additionalProperties".to_string(), json!(false));
    Value::Object(schema)
}
