//! Report Generation Module
//!
//! Renders a mutation run for the delivery layer:
//! - JSON (machine-readable, one object per candidate request)
//! - Text (raw requests separated by a marker line, for piping into other tools)

pub mod formats;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::MutationResult;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Report metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Tool version
    pub version: String,
    /// Callback base URL used for SSRF probes
    pub correlation_url: String,
    /// Strategy names, in run order
    pub strategies: Vec<String>,
}

impl ReportMetadata {
    pub fn new(correlation_url: &str, strategies: &[&str]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            correlation_url: correlation_url.to_string(),
            strategies: strategies.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of candidate requests
    pub total_results: usize,
    /// Distinct tokens that were mutated
    pub subjects: Vec<String>,
    /// Candidates per strategy
    pub by_strategy: BTreeMap<String, usize>,
    /// Candidates per variant
    pub by_variant: BTreeMap<String, usize>,
}

impl ReportSummary {
    /// Calculate summary from results
    pub fn from_results(results: &[MutationResult]) -> Self {
        let mut subjects: Vec<String> = Vec::new();
        let mut by_strategy: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_variant: BTreeMap<String, usize> = BTreeMap::new();

        for result in results {
            if !subjects.contains(&result.original_token) {
                subjects.push(result.original_token.clone());
            }
            *by_strategy.entry(result.strategy.clone()).or_insert(0) += 1;
            *by_variant.entry(result.variant.name().to_string()).or_insert(0) += 1;
        }

        Self {
            total_results: results.len(),
            subjects,
            by_strategy,
            by_variant,
        }
    }
}

/// Complete run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: ReportSummary,
    /// All candidate requests
    pub results: Vec<MutationResult>,
}

impl MutationReport {
    pub fn new(results: Vec<MutationResult>, metadata: ReportMetadata) -> Self {
        let summary = ReportSummary::from_results(&results);
        Self {
            metadata,
            summary,
            results,
        }
    }

    /// Render in the given format
    pub fn render(&self, format: OutputFormat, pretty: bool) -> Result<String> {
        match format {
            OutputFormat::Json if pretty => formats::json::generate(self),
            OutputFormat::Json => formats::json::generate_minified(self),
            OutputFormat::Text => Ok(formats::text::generate(self)),
        }
    }
}
