//! Mutation strategies
//!
//! A strategy turns one decoded token into a list of labelled mutated tokens.
//! Strategies never touch the signature; the engine re-encodes and expands them.

mod none_algorithm;
mod payload_claim;
mod ssrf_header;

pub use none_algorithm::NoneAlgorithmStrategy;
pub use payload_claim::{NonNumericClaims, PayloadClaimStrategy};
pub use ssrf_header::SsrfHeaderStrategy;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::jwt::DecodedToken;

/// One mutated token produced by a strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Candidate value or mutated property
    pub label: String,
    /// Mutated token, signature unchanged
    pub token: DecodedToken,
}

impl Mutation {
    pub fn new(label: impl Into<String>, token: DecodedToken) -> Self {
        Self {
            label: label.into(),
            token,
        }
    }
}

/// Common interface for mutation strategies
pub trait MutationStrategy: Send + Sync {
    /// Strategy name, used as the result label
    fn name(&self) -> &str;

    /// Produce mutations of `decoded` without modifying it
    fn apply(&self, decoded: &DecodedToken) -> Vec<Mutation>;
}

/// Built-in strategy selector used by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Algorithm set to "none" and look-alikes
    #[serde(rename = "none", alias = "none_algorithm")]
    #[value(name = "none", alias = "none_algorithm")]
    NoneAlgorithm,
    /// Key URL headers pointed at the correlation URL
    #[serde(alias = "ssrf_header")]
    #[value(alias = "ssrf_header")]
    Ssrf,
    /// Numeric claims incremented by one
    PayloadClaim,
}

impl StrategyKind {
    pub fn all() -> &'static [StrategyKind] {
        &[
            StrategyKind::NoneAlgorithm,
            StrategyKind::Ssrf,
            StrategyKind::PayloadClaim,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::NoneAlgorithm => "none_algorithm",
            StrategyKind::Ssrf => "ssrf_header",
            StrategyKind::PayloadClaim => "payload_claim",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build strategy instances for the given kinds, in order
pub fn build(
    kinds: &[StrategyKind],
    correlation_url: &str,
    non_numeric: NonNumericClaims,
) -> Vec<Box<dyn MutationStrategy>> {
    kinds
        .iter()
        .map(|kind| -> Box<dyn MutationStrategy> {
            match kind {
                StrategyKind::NoneAlgorithm => Box::new(NoneAlgorithmStrategy),
                StrategyKind::Ssrf => Box::new(SsrfHeaderStrategy::new(correlation_url)),
                StrategyKind::PayloadClaim => {
                    Box::new(PayloadClaimStrategy::new().with_non_numeric(non_numeric))
                }
            }
        })
        .collect()
}
