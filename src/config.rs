//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::TokenSelection;
use crate::error::ConfigError;
use crate::reporting::OutputFormat;
use crate::strategies::{NonNumericClaims, StrategyKind};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mutation engine settings
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Callback base URL for SSRF probes, used verbatim
    pub correlation_url: String,

    /// Strategies to apply, in order
    pub strategies: Vec<StrategyKind>,

    /// Expand every mutated token into its syntactic variants
    pub expand_variants: bool,

    /// Which extracted tokens to mutate
    pub token_selection: TokenSelection,

    /// Handling of claims that are not numbers
    pub non_numeric_claims: NonNumericClaims,

    /// Strip base64 padding from re-encoded tokens
    pub strip_padding: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report format
    pub format: OutputFormat,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            correlation_url: "http://127.0.0.1:8000/".to_string(),
            strategies: StrategyKind::all().to_vec(),
            expand_variants: true,
            token_selection: TokenSelection::First,
            non_numeric_claims: NonNumericClaims::Skip,
            strip_padding: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// An explicit path must exist. Without one the default location is tried and
    /// defaults are used when nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.display().to_string()));
                }
                p.to_path_buf()
            }
            None => match Self::default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    tracing::info!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents =
            std::fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
                path: config_path.display().to_string(),
                source,
            })?;

        let config = Self::from_toml(&contents)?;
        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.engine.correlation_url).map_err(|e| {
            ConfigError::ValidationError {
                field: "engine.correlation_url".into(),
                reason: e.to_string(),
            }
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError {
                field: "engine.correlation_url".into(),
                reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
            });
        }

        if self.engine.strategies.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "engine.strategies".into(),
                reason: "at least one strategy is required".into(),
            });
        }

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "jwt-probe", "jwt-probe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get data directory path
    pub fn data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "jwt-probe", "jwt-probe")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }
}
