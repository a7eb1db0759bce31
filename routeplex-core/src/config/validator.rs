//! Configuration validation utilities

use super::env::env_var_pattern;
use super::error::{ConfigError, ValidationError, ValidationErrorKind};
use super::schema::RouteplexConfig;
use regex::Regex;

/// Configuration validator with additional validation rules
pub struct ConfigValidator {
    /// Pattern for environment variable placeholders
    env_var_pattern: Regex,
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            env_var_pattern: env_var_pattern()?,
        })
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &RouteplexConfig) -> Result<(), ValidationError> {
        // First run the built-in validation
        config.validate()?;

        self.validate_enabled(config)?;
        self.validate_placeholders(config)?;

        Ok(())
    }

    /// A router with nothing enabled can never answer
    fn validate_enabled(&self, config: &RouteplexConfig) -> Result<(), ValidationError> {
        if !config.providers.iter().any(|p| p.enabled) {
            return Err(ValidationError::new(
                "providers",
                ValidationErrorKind::NoEnabledProvider,
            ));
        }
        Ok(())
    }

    /// Placeholders must be resolved before adapters are built
    fn validate_placeholders(&self, config: &RouteplexConfig) -> Result<(), ValidationError> {
        for (i, provider) in config.providers.iter().enumerate() {
            let unresolved = self.extract_env_vars(provider.api_key.expose_secret());
            if let Some(var) = unresolved.first() {
                return Err(ValidationError::new(
                    format!("providers[{i}].api_key"),
                    ValidationErrorKind::UnresolvedPlaceholder { var: var.clone() },
                ));
            }
        }
        Ok(())
    }

    /// Extract environment variable names from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        self.env_var_pattern
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}
