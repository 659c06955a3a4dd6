//! Plain text Report Generator
//!
//! One block per candidate: a marker line with the labels, then the raw request.

use crate::reporting::MutationReport;

/// Generate text report
pub fn generate(report: &MutationReport) -> String {
    let mut out = String::new();

    for (idx, result) in report.results.iter().enumerate() {
        out.push_str(&format!(
            "### [{}] {} {} {} ({})\n",
            idx + 1,
            result.strategy,
            display_label(&result.mutated_property),
            result.variant,
            result.header_name
        ));
        out.push_str(&result.request);
        if !result.request.ends_with('\n') {
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "### {} candidate request(s)\n",
        report.summary.total_results
    ));
    out
}

fn display_label(label: &str) -> String {
    if label.is_empty() {
        "\"\"".to_string()
    } else {
        label.to_string()
    }
}
