//! Claim tampering
//!
//! Bumps each claim by one while keeping the original signature, which a verifier
//! that skips signature checks will accept as a different identity or lifetime.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::{Mutation, MutationStrategy};
use crate::error::{ProbeError, Result};
use crate::jwt::DecodedToken;

/// Handling of claims whose value is not a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonNumericClaims {
    /// Leave the claim out of the mutations
    #[default]
    Skip,
    /// Append "1" to string claims; other types are still skipped
    Concatenate,
}

/// Produces one mutation per incrementable payload claim, never an empty list
#[derive(Debug, Clone, Default)]
pub struct PayloadClaimStrategy {
    non_numeric: NonNumericClaims,
}

impl PayloadClaimStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_non_numeric(mut self, policy: NonNumericClaims) -> Self {
        self.non_numeric = policy;
        self
    }

    /// The claim value plus one
    pub fn increment(&self, claim: &str, value: &Value) -> Result<Value> {
        increment_with(self.non_numeric, claim, value)
    }

    fn mutate_claims(&self, decoded: &DecodedToken, policy: NonNumericClaims) -> Vec<Mutation> {
        decoded
            .payload
            .iter()
            .filter_map(|(claim, value)| match increment_with(policy, claim, value) {
                Ok(bumped) => {
                    Some(Mutation::new(claim.clone(), decoded.with_claim(claim, bumped)))
                }
                Err(e) => {
                    tracing::debug!(claim = %claim, error = %e, "Skipping claim");
                    None
                }
            })
            .collect()
    }
}

fn increment_with(policy: NonNumericClaims, claim: &str, value: &Value) -> Result<Value> {
    match value {
        Value::Number(n) => increment_number(n).map(Value::Number).ok_or_else(|| {
            ProbeError::UnsupportedClaimType {
                claim: claim.to_string(),
                kind: format!("number {} that cannot be incremented", n),
            }
        }),
        Value::String(s) if policy == NonNumericClaims::Concatenate => {
            Ok(Value::String(format!("{}1", s)))
        }
        other => Err(ProbeError::UnsupportedClaimType {
            claim: claim.to_string(),
            kind: json_type(other).to_string(),
        }),
    }
}

fn increment_number(n: &Number) -> Option<Number> {
    if let Some(i) = n.as_i64() {
        return i.checked_add(1).map(Number::from).or_else(|| {
            // i64::MAX still fits once widened
            u64::try_from(i).ok().and_then(|u| u.checked_add(1)).map(Number::from)
        });
    }
    if let Some(u) = n.as_u64() {
        return u.checked_add(1).map(Number::from);
    }
    n.as_f64().and_then(|f| Number::from_f64(f + 1.0))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl MutationStrategy for PayloadClaimStrategy {
    fn name(&self) -> &str {
        "payload_claim"
    }

    fn apply(&self, decoded: &DecodedToken) -> Vec<Mutation> {
        let mut mutations = self.mutate_claims(decoded, self.non_numeric);

        if mutations.is_empty() && self.non_numeric == NonNumericClaims::Skip {
            tracing::debug!("No numeric claim, falling back to string concatenation");
            mutations = self.mutate_claims(decoded, NonNumericClaims::Concatenate);
        }

        // always at least one entry per invocation
        if mutations.is_empty() {
            let label = decoded.payload.keys().next().cloned().unwrap_or_default();
            tracing::warn!(
                claims = decoded.payload.len(),
                claim = %label,
                "No payload claim could be mutated, emitting payload unchanged"
            );
            mutations.push(Mutation::new(label, decoded.clone()));
        }

        mutations
    }
}
