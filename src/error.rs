//! Error types for jwt-probe
//!
//! Library code returns [`ProbeError`]; the binary wraps it in `anyhow` at the edges.

use thiserror::Error;

/// Main error type for token extraction and mutation
#[derive(Error, Debug)]
pub enum ProbeError {
    /// No candidate JWT in the request headers. Not fatal: the caller decides what to do next.
    #[error("No candidate token found in request headers")]
    NoTokenFound,

    /// Token failed structural, base64url or JSON decoding
    #[error("Malformed token: {reason}")]
    MalformedToken { reason: String },

    /// A payload claim whose value cannot be incremented
    #[error("Unsupported claim type for '{claim}': {kind}")]
    UnsupportedClaimType { claim: String, kind: String },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path}")]
    ReadError { path: String, source: std::io::Error },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Configuration file not found: {0}")]
    NotFound(String),
}

impl ProbeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProbeError::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Whether the error should abort processing of the current request.
    ///
    /// `NoTokenFound` just means there is nothing to mutate, and an unsupported claim
    /// only ever affects that one claim.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ProbeError::NoTokenFound | ProbeError::UnsupportedClaimType { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ProbeError::NoTokenFound => {
                "No JWT found in the request headers. Nothing to mutate.".into()
            }
            ProbeError::MalformedToken { reason } => {
                format!("The token could not be decoded ({}). Check that it is a compact JWT.", reason)
            }
            ProbeError::UnsupportedClaimType { claim, kind } => {
                format!("Claim '{}' holds a {} value and was left unchanged.", claim, kind)
            }
            ProbeError::Config(e) => format!("Configuration problem: {}", e.user_hint()),
            ProbeError::Serialization(e) => format!("Could not serialize token JSON: {}", e),
        }
    }
}

/// Trait for providing user-friendly hints
pub trait UserHint {
    fn user_hint(&self) -> String;
}

impl UserHint for ConfigError {
    fn user_hint(&self) -> String {
        match self {
            ConfigError::ReadError { path, .. } => {
                format!("Could not read '{}'. Check if the file exists and you have read permissions.", path)
            }
            ConfigError::ParseError(_) => {
                "The configuration file has invalid syntax. Check for TOML formatting errors.".into()
            }
            ConfigError::ValidationError { field, reason } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            ConfigError::NotFound(path) => {
                format!("Configuration file '{}' not found. Run with --generate-config to create one.", path)
            }
        }
    }
}

pub type Result<T, E = ProbeError> = std::result::Result<T, E>;
