//! Compact serialization codec
//!
//! Decoding accepts padded and unpadded base64url. Encoding writes compact JSON
//! in map order, so keys keep their insertion order across a round trip.

use base64::{
    alphabet,
    engine::{
        general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
    },
    Engine,
};

use super::{DecodedToken, JsonMap};
use crate::error::{ProbeError, Result};

/// base64url decoder that ignores whether `=` padding is present
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a compact JWT into header, payload and raw signature
pub fn decode(token: &str) -> Result<DecodedToken> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ProbeError::malformed(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    }

    let header = decode_segment(parts[0], "header")?;
    let payload = decode_segment(parts[1], "payload")?;

    Ok(DecodedToken {
        header,
        payload,
        signature: parts[2].to_string(),
    })
}

fn decode_segment(segment: &str, name: &str) -> Result<JsonMap> {
    let bytes = URL_SAFE_LENIENT
        .decode(segment)
        .map_err(|e| ProbeError::malformed(format!("{} is not base64url: {}", name, e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ProbeError::malformed(format!("{} is not a JSON object: {}", name, e)))
}

/// Encode header and payload and join them with the raw signature
///
/// With `strip_padding` the segments carry no `=` characters.
pub fn encode(
    header: &JsonMap,
    payload: &JsonMap,
    signature: &str,
    strip_padding: bool,
) -> Result<String> {
    let engine = if strip_padding { &URL_SAFE_NO_PAD } else { &URL_SAFE };

    let header_b64 = engine.encode(serde_json::to_vec(header)?);
    let payload_b64 = engine.encode(serde_json::to_vec(payload)?);

    Ok(format!("{}.{}.{}", header_b64, payload_b64, signature))
}

/// Encode a decoded token with padding stripped
pub fn encode_token(token: &DecodedToken) -> Result<String> {
    encode(&token.header, &token.payload, &token.signature, true)
}
