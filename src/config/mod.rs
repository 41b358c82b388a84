//! Configuration management
//!
//! Configuration is layered: defaults, then an optional file, then
//! `ROAP__<SECTION>__<KEY>` environment variables.

use crate::domain::munging::MungingOptions;
use crate::domain::roap::{NegotiationOptions, RESERVED_TIE_BREAKER};
use crate::domain::validation::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const ENV_PREFIX: &str = "ROAP";
const ENV_SEPARATOR: &str = "__";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roap: RoapConfig,
    pub munging: MungingOptions,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoapConfig {
    /// Sequence number a new session starts from
    pub initial_seq: u32,
    /// Automatic offer retries before giving up
    pub max_retries: u32,
    /// Tie-breaker sent with every OFFER
    pub tie_breaker: u32,
    /// Buffer size of the negotiation event channel
    pub event_capacity: usize,
}

impl Default for RoapConfig {
    fn default() -> Self {
        Self {
            initial_seq: 0,
            max_retries: 2,
            tie_breaker: RESERVED_TIE_BREAKER,
            event_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate every munged local offer and answer before sending it
    pub validate_local_sdp: bool,
    pub allow_port_0: bool,
    pub require_h264: bool,
}

impl ValidationConfig {
    pub fn options(&self) -> ValidationOptions {
        ValidationOptions {
            allow_port_0: self.allow_port_0,
            require_h264: self.require_h264,
        }
    }
}

impl Config {
    /// Load from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roap.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "roap.event_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for a new negotiation session
    pub fn negotiation_options(&self) -> NegotiationOptions {
        NegotiationOptions {
            initial_seq: self.roap.initial_seq,
            max_retries: self.roap.max_retries,
            tie_breaker: self.roap.tie_breaker,
            munging: self.munging.clone(),
            validate_local_sdp: self.validation.validate_local_sdp,
            validation: self.validation.options(),
        }
    }
}
