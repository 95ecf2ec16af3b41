use std::path::Path;

use log::{info, warn};
use serde_json::Value;

use crate::DEFAULT_DEFINITION_KEYWORD;
use crate::config::SplitConfig;
use crate::convert::{ConvertOptions, Converter, JsonSchemaLowering};
use crate::document;
use crate::emit::{OutputDir, SchemaSink};
use crate::error::{RunError, SplitError};
use crate::extract::{self, ExtractContext, ExtractReport};

/// Outcome of a run that got past loading the document.
#[derive(Debug)]
pub struct RunReport {
    /// Effective definition keywords, in processing order.
    pub keywords: Vec<String>,
    pub extract: ExtractReport,
    /// Set when conversion or extraction stopped early. Files written
    /// before the failure are kept.
    pub failure: Option<SplitError>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Split a comma-separated keyword list, dropping blanks.
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(String::from)
        .collect()
}

/// Extra keywords followed by `components.schemas`, without duplicates.
pub fn definition_keywords(extra: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::with_capacity(extra.len() + 1);
    let candidates = extra
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(DEFAULT_DEFINITION_KEYWORD));
    for keyword in candidates {
        if !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}

/// Load → convert → extract components → extract paths.
pub struct Pipeline<C = JsonSchemaLowering> {
    config: SplitConfig,
    converter: C,
}

impl Pipeline {
    pub fn new(config: SplitConfig) -> Self {
        Self::with_converter(config, JsonSchemaLowering)
    }
}

impl<C: Converter> Pipeline<C> {
    pub fn with_converter(config: SplitConfig, converter: C) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Wipe `output`, then split the document at `input` into it.
    ///
    /// The output directory is cleared before the input is read, so a
    /// missing input leaves it empty.
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunReport, RunError> {
        let mut out = OutputDir::prepare(output)?;
        self.run_with_sink(input, &mut out)
    }

    /// Split the document at `input` into an already prepared sink.
    pub fn run_with_sink(
        &self,
        input: &Path,
        sink: &mut dyn SchemaSink,
    ) -> Result<RunReport, RunError> {
        let original = document::load(input)?;
        Ok(self.split_document(&original, sink))
    }

    /// Split a parsed document. Never fails: conversion and extraction
    /// errors end the run early and are recorded in the report.
    pub fn split_document(&self, original: &Value, sink: &mut dyn SchemaSink) -> RunReport {
        let keywords = definition_keywords(&self.config.definition_keywords);
        let mut ctx = ExtractContext::new(&self.config, sink);
        let outcome = self.split(original, &keywords, &mut ctx);
        let report = ctx.finish();

        match &outcome {
            Ok(()) => info!(
                "wrote {} schemas ({} entries skipped)",
                report.written.len(),
                report.skipped.len()
            ),
            Err(err) => warn!(
                "{err}; stopped after writing {} schemas",
                report.written.len()
            ),
        }

        RunReport {
            keywords,
            extract: report,
            failure: outcome.err(),
        }
    }

    fn split(
        &self,
        original: &Value,
        keywords: &[String],
        ctx: &mut ExtractContext<'_>,
    ) -> Result<(), SplitError> {
        let options = ConvertOptions {
            definition_keywords: keywords.to_vec(),
        };
        let converted = self.converter.convert(original, &options)?;
        extract::extract_components(ctx, &converted, original, keywords)?;
        extract::extract_paths(ctx, &converted)?;
        Ok(())
    }
}
