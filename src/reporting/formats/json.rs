//! JSON Report Generator

use anyhow::Result;

use crate::reporting::MutationReport;

/// Generate JSON report
pub fn generate(report: &MutationReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

/// Generate minified JSON report
pub fn generate_minified(report: &MutationReport) -> Result<String> {
    let json = serde_json::to_string(report)?;
    Ok(json)
}
