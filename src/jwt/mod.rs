//! JWT compact serialization
//!
//! Decoding/encoding of `header.payload.signature` tokens and the syntactic
//! variants used to probe parser leniency.

pub mod codec;
pub mod variants;

pub use codec::{decode, encode, encode_token};
pub use variants::{variants, VariantKind};

use serde_json::{Map, Value};

/// JSON object with insertion-ordered keys
pub type JsonMap = Map<String, Value>;

/// Decoded JWT
///
/// The signature is kept verbatim and never validated.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Decoded header
    pub header: JsonMap,
    /// Decoded payload (claims)
    pub payload: JsonMap,
    /// Raw signature segment, possibly empty
    pub signature: String,
}

impl DecodedToken {
    pub fn new(header: JsonMap, payload: JsonMap, signature: impl Into<String>) -> Self {
        Self {
            header,
            payload,
            signature: signature.into(),
        }
    }

    /// Algorithm (alg) as text, if it is a string
    pub fn alg(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// Copy with one header field inserted or overwritten in place
    pub fn with_header_field(&self, key: &str, value: Value) -> Self {
        let mut token = self.clone();
        token.header.insert(key.to_string(), value);
        token
    }

    /// Copy with one claim inserted or overwritten in place
    pub fn with_claim(&self, key: &str, value: Value) -> Self {
        let mut token = self.clone();
        token.payload.insert(key.to_string(), value);
        token
    }
}
