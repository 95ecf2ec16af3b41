pub mod config;
pub mod convert;
pub mod document;
pub mod emit;
pub mod error;
pub mod extract;
pub mod naming;
pub mod pipeline;
pub mod rewrite;

pub use pipeline::{Pipeline, RunReport};

/// Definition keyword that is always extracted.
pub const DEFAULT_DEFINITION_KEYWORD: &str = "components.schemas";
