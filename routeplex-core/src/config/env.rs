//! Environment variable interpolation for configuration

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;

/// `${NAME}` placeholder with an upper-case variable name
const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

pub(crate) fn env_var_pattern() -> Result<Regex, ConfigError> {
    Regex::new(ENV_VAR_PATTERN).map_err(|e| ConfigError::Invalid {
        message: format!("bad placeholder pattern: {e}"),
    })
}

/// Interpolate environment variables in a configuration string.
///
/// Every placeholder is replaced; the first unset variable is reported.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let pattern = env_var_pattern()?;
    let mut missing: Option<String> = None;

    let result = pattern.replace_all(content, |cap: &Captures<'_>| match env::var(&cap[1]) {
        Ok(value) => value,
        Err(_) => {
            missing.get_or_insert_with(|| cap[1].to_string());
            String::new()
        }
    });

    if let Some(var) = missing {
        return Err(ConfigError::MissingEnvVar { var });
    }

    Ok(result.into_owned())
}
