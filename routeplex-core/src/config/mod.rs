//! Configuration module for Routeplex
//!
//! This module provides the configuration schema, loading and validation
//! for the providers a [`CompositeRouter`] is built from.
//!
//! [`CompositeRouter`]: crate::providers::CompositeRouter

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::interpolate_env_vars;
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{ProviderConfig, RouteplexConfig, SelectionConfig, SUPPORTED_VERSION};
pub use secrets::{SafeLogging, SecretString};
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<RouteplexConfig> {
    let path = path.as_ref();
    let content = read(path)?;
    parse_yaml(&content, &path.to_string_lossy())
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<RouteplexConfig> {
    let path = path.as_ref();
    let content = read(path)?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let config: RouteplexConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    finish(config)
}

/// Parse and validate a YAML configuration held in memory
pub fn from_yaml_str(content: &str) -> ConfigResult<RouteplexConfig> {
    parse_yaml(content, "<string>")
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn parse_yaml(content: &str, origin: &str) -> ConfigResult<RouteplexConfig> {
    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(content)?;

    let config: RouteplexConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    finish(config)
}

fn finish(config: RouteplexConfig) -> ConfigResult<RouteplexConfig> {
    ConfigValidator::new()?.validate(&config)?;
    for provider in &config.providers {
        debug!(provider = %provider.safe_for_logging(), "Loaded provider configuration");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderKind, SelectionMetric};

    #[test]
    fn test_load_valid_yaml() {
        std::env::set_var("ROUTEPLEX_MOD_GOOGLE_KEY", "AIza-test");
        let yaml = r#"
version: "0.1"
providers:
  - name: Google
    type: google_routes
    api_key: ${ROUTEPLEX_MOD_GOOGLE_KEY}
  - type: mapbox_fleet
    api_key: pk.test-token
    timeout_secs: 45
selection:
  metric: distance
  max_concurrency: 2
"#;
        let config = from_yaml_str(yaml).unwrap();
        std::env::remove_var("ROUTEPLEX_MOD_GOOGLE_KEY");

        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].api_key.expose_secret(), "AIza-test");
        assert_eq!(config.providers[1].kind, ProviderKind::MapboxFleet);
        assert_eq!(config.providers[1].resolved_name(), "MapboxFleet");
        assert_eq!(config.selection.metric, SelectionMetric::Distance);
        assert_eq!(config.selection.max_concurrency, 2);
    }

    #[test]
    fn test_selection_defaults() {
        let config = from_yaml_str(
            r#"
version: "0.1"
providers:
  - type: mapbox_trips
    api_key: pk.test-token
"#,
        )
        .unwrap();
        assert_eq!(config.selection.metric, SelectionMetric::Duration);
        assert_eq!(config.selection.max_concurrency, 4);
        assert!(config.providers[0].enabled);
    }

    #[test]
    fn test_unknown_provider_type() {
        let result = from_yaml_str(
            r#"
version: "0.1"
providers:
  - type: here_maps
    api_key: abc
"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
