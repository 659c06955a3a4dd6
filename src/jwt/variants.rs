//! Syntactic token variants
//!
//! Each variant targets a verifier that is lenient about the signature segment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntactic variant of an encoded token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Token unchanged
    Original,
    /// `header.payload.` - dangling dot read as an empty signature
    TrailingDot,
    /// `header.payload` - missing segment read as "no signature required"
    NoDotNoSig,
    /// Signature with one extra character - presence checked but not verified
    CorruptedSignature,
}

impl VariantKind {
    pub fn all() -> &'static [VariantKind] {
        &[
            VariantKind::Original,
            VariantKind::TrailingDot,
            VariantKind::NoDotNoSig,
            VariantKind::CorruptedSignature,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            VariantKind::Original => "original",
            VariantKind::TrailingDot => "trailing_dot",
            VariantKind::NoDotNoSig => "no_dot_no_sig",
            VariantKind::CorruptedSignature => "corrupted_signature",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Produce the four variants of `token`, in [`VariantKind::all`] order
pub fn variants(token: &str) -> [(VariantKind, String); 4] {
    let mut parts = token.splitn(3, '.');
    let header = parts.next().unwrap_or_default();
    let payload = parts.next().unwrap_or_default();
    let signature = parts.next().unwrap_or_default();

    [
        (VariantKind::Original, token.to_string()),
        (VariantKind::TrailingDot, format!("{}.{}.", header, payload)),
        (VariantKind::NoDotNoSig, format!("{}.{}", header, payload)),
        (
            VariantKind::CorruptedSignature,
            format!("{}.{}.{}a", header, payload, signature),
        ),
    ]
}
