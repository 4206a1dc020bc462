use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

use crate::table_catalog::DEFAULT_MAX_IDENTIFIER_LENGTH;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Resolver configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Upper bound on metadata lookups in flight for one resolution
    #[validate(range(
        min = 1,
        max = 256,
        message = "Max concurrent lookups must be between 1 and 256"
    ))]
    pub max_concurrent_lookups: usize,

    /// Warehouse identifier length limit used by the physical naming conventions
    #[validate(range(
        min = 16,
        max = 255,
        message = "Max identifier length must be between 16 and 255"
    ))]
    pub max_identifier_length: usize,

    /// Also rewrite `"schema"."table"` and `` `schema`.`table` `` spellings
    pub rewrite_quoted_identifiers: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: 16,
            max_identifier_length: DEFAULT_MAX_IDENTIFIER_LENGTH,
            rewrite_quoted_identifiers: true,
        }
    }
}

impl ResolverConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_concurrent_lookups: parse_env_var("DRA_RESOLVER_MAX_CONCURRENT_LOOKUPS", "16")?,
            max_identifier_length: parse_env_var(
                "DRA_RESOLVER_MAX_IDENTIFIER_LENGTH",
                &DEFAULT_MAX_IDENTIFIER_LENGTH.to_string(),
            )?,
            rewrite_quoted_identifiers: parse_env_var(
                "DRA_RESOLVER_REWRITE_QUOTED_IDENTIFIERS",
                "true",
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides on top of this configuration
    pub fn apply_cli(mut self, cli: &CliConfig) -> Result<Self, ConfigError> {
        if let Some(n) = cli.max_concurrent_lookups {
            self.max_concurrent_lookups = n;
        }
        if let Some(n) = cli.max_identifier_length {
            self.max_identifier_length = n;
        }
        if cli.no_quoted_identifiers {
            self.rewrite_quoted_identifiers = false;
        }

        self.validate()?;
        Ok(self)
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub max_concurrent_lookups: Option<usize>,
    pub max_identifier_length: Option<usize>,
    pub no_quoted_identifiers: bool,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
