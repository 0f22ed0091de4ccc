//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `upstream.url`.
pub const ENV_INFLUX_URL: &str = "INFLUX_URL";
/// Environment variable overriding `upstream.token`.
pub const ENV_INFLUX_TOKEN: &str = "INFLUX_TOKEN";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML document into a configuration. Missing keys take defaults.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides using `lookup` to resolve variables.
///
/// Only set, non-empty variables replace the current value.
pub fn apply_env_overrides<F>(mut config: RelayConfig, lookup: F) -> RelayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(url) = get(ENV_INFLUX_URL) {
        config.upstream.url = url;
    }
    if let Some(token) = get(ENV_INFLUX_TOKEN) {
        config.upstream.token = token;
    }
    if let Some(addr) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    config
}

/// Build the effective configuration: defaults, then the optional TOML file,
/// then the process environment. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
