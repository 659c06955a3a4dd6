//! Key URL header injection
//!
//! Some verifiers dereference `jku`, `x5u` or `kid` to fetch signing keys. Pointing
//! them at a correlation URL reveals the fetch as an out-of-band callback.

use serde_json::Value;

use super::{Mutation, MutationStrategy};
use crate::jwt::DecodedToken;

/// Header fields that may be fetched by a verifier, in output order
pub const SSRF_PROPERTIES: &[&str] = &["jku", "x5u", "kid"];

/// Marker sent in every callback URL so hits can be told apart from other traffic
const CALLBACK_TYPE: &str = "jwtssrftest";

/// Sets each key URL header to a correlation callback URL
#[derive(Debug, Clone)]
pub struct SsrfHeaderStrategy {
    correlation_url: String,
}

impl SsrfHeaderStrategy {
    pub fn new(correlation_url: impl Into<String>) -> Self {
        Self {
            correlation_url: correlation_url.into(),
        }
    }

    /// Callback URL for one header property
    ///
    /// The base URL is used verbatim; query parameters are appended to any it already has.
    pub fn callback_url(&self, property: &str) -> String {
        let separator = if self.correlation_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{}type={}&key={}",
            self.correlation_url, separator, CALLBACK_TYPE, property
        )
    }
}

impl MutationStrategy for SsrfHeaderStrategy {
    fn name(&self) -> &str {
        "ssrf_header"
    }

    fn apply(&self, decoded: &DecodedToken) -> Vec<Mutation> {
        SSRF_PROPERTIES
            .iter()
            .map(|property| {
                let url = Value::String(self.callback_url(property));
                Mutation::new(*property, decoded.with_header_field(property, url))
            })
            .collect()
    }
}
