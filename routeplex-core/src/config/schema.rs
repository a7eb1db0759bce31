//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use super::secrets::{SafeLogging, SecretString};
use crate::providers::{ProviderKind, ProviderSettings, SelectionMetric, DEFAULT_MAX_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Schema version understood by this crate
pub const SUPPORTED_VERSION: &str = "0.1";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteplexConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Route providers, in registration order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Best-route selection settings
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Route provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider name; defaults per vendor capability
    #[serde(default)]
    pub name: Option<String>,

    /// Vendor capability
    #[serde(rename = "type")]
    pub kind: ProviderKind,

    /// API key or access token (supports environment variable interpolation)
    pub api_key: SecretString,

    /// Vendor API root; defaults per vendor capability
    #[serde(default)]
    pub base_url: Option<String>,

    /// Cloud project, required for `google_fleet`
    #[serde(default)]
    pub project_id: Option<String>,

    /// Per-call timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Whether this provider is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Selection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Quantity minimised by `select_best`
    #[serde(default)]
    pub metric: SelectionMetric,

    /// Provider calls allowed in flight at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            metric: SelectionMetric::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool { true }
fn default_max_concurrency() -> usize { DEFAULT_MAX_CONCURRENCY }

impl RouteplexConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::missing("version"));
        }

        if self.version != SUPPORTED_VERSION {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::UnsupportedVersion {
                    found: self.version.clone(),
                },
            ));
        }

        if self.providers.is_empty() {
            return Err(ValidationError::missing("providers")
                .with_context("At least one provider must be configured"));
        }

        // Lookup by name is case-insensitive, so uniqueness is too
        let mut seen_names = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let name = provider.resolved_name();
            if !seen_names.insert(name.to_lowercase()) {
                return Err(ValidationError::new(
                    format!("providers[{}].name", i),
                    ValidationErrorKind::DuplicateName {
                        name: name.to_string(),
                    },
                ));
            }

            provider.validate(&format!("providers[{}]", i))?;
        }

        if self.selection.max_concurrency == 0 {
            return Err(ValidationError::not_positive("selection.max_concurrency"));
        }

        Ok(())
    }
}

impl ProviderConfig {
    /// Configured name, or the vendor default
    pub fn resolved_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.default_name())
    }

    /// Adapter settings with vendor defaults filled in
    pub fn settings(&self) -> ProviderSettings {
        let mut settings = ProviderSettings::for_kind(self.kind).with_name(self.resolved_name());
        if let Some(base_url) = &self.base_url {
            settings = settings.with_base_url(base_url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        settings
    }

    /// Validate provider configuration
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ValidationError::missing(format!("{}.name", path)));
        }

        if self.api_key.is_empty() {
            return Err(ValidationError::missing(format!("{}.api_key", path)));
        }

        if let Some(base_url) = &self.base_url {
            match url::Url::parse(base_url) {
                Ok(url) => {
                    if url.scheme() != "http" && url.scheme() != "https" {
                        return Err(ValidationError::invalid_url(
                            format!("{}.base_url", path),
                            format!("URL scheme must be http or https, got: {}", url.scheme()),
                        ));
                    }
                }
                Err(e) => {
                    return Err(ValidationError::invalid_url(
                        format!("{}.base_url", path),
                        e.to_string(),
                    ));
                }
            }
        }

        if self.kind == ProviderKind::GoogleFleet
            && self.project_id.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(ValidationError::missing(format!("{}.project_id", path))
                .with_context("google_fleet providers call a Cloud project"));
        }

        if self.timeout_secs == Some(0) {
            return Err(ValidationError::not_positive(format!("{}.timeout_secs", path)));
        }

        Ok(())
    }
}

impl SafeLogging for ProviderConfig {
    fn safe_for_logging(&self) -> String {
        format!(
            "{} ({:?}, key {}, {})",
            self.resolved_name(),
            self.kind,
            self.api_key.partial_redact(),
            if self.enabled { "enabled" } else { "disabled" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(kind: ProviderKind) -> ProviderConfig {
        ProviderConfig {
            name: None,
            kind,
            api_key: SecretString::new("key-123456789"),
            base_url: None,
            project_id: None,
            timeout_secs: None,
            enabled: true,
        }
    }

    #[test]
    fn test_settings_defaults() {
        let settings = provider(ProviderKind::MapboxTrips).settings();
        assert_eq!(settings.name, "Mapbox");
        assert_eq!(settings.base_url, "https://api.mapbox.com");
        assert_eq!(settings.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_settings_overrides() {
        let mut config = provider(ProviderKind::GoogleRoutes);
        config.name = Some("Primary".to_string());
        config.base_url = Some("http://localhost:9000".to_string());
        config.timeout_secs = Some(3);

        let settings = config.settings();
        assert_eq!(settings.name, "Primary");
        assert_eq!(settings.base_url, "http://localhost:9000");
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_fleet_requires_project() {
        let mut config = provider(ProviderKind::GoogleFleet);
        let err = config.validate("providers[0]").unwrap_err();
        assert_eq!(err.field_path, "providers[0].project_id");

        config.project_id = Some("demo".to_string());
        assert!(config.validate("providers[0]").is_ok());
    }

    #[test]
    fn test_safe_for_logging_hides_key() {
        let line = provider(ProviderKind::MapboxFleet).safe_for_logging();
        assert!(line.starts_with("MapboxFleet"));
        assert!(!line.contains("key-123456789"));
    }
}
