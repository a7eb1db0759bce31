//! Errors raised while loading a router configuration

use crate::http::TransportError;
use std::fmt;
use thiserror::Error;

/// Failure to turn a configuration file into a usable router setup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML or JSON syntax, unknown fields, or an unknown provider type
    #[error("cannot parse '{path}'{}: {message}", position(.line, .column))]
    Parse {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("environment variable '{var}' is not set")]
    MissingEnvVar { var: String },

    /// Settings that parse and validate but cannot build an adapter
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("cannot create HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

fn position(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at {line}:{column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

/// A rejected setting, located by its path in the document
/// (e.g. `providers[0].api_key`)
#[derive(Debug, Error)]
pub struct ValidationError {
    pub field_path: String,
    pub kind: ValidationErrorKind,
    pub context: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_path, self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

/// The rule a setting broke
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("missing or empty")]
    Missing,

    #[error("schema version {found} is not supported (expected {})", super::SUPPORTED_VERSION)]
    UnsupportedVersion { found: String },

    /// Provider names are compared case-insensitively
    #[error("provider name '{name}' is already taken")]
    DuplicateName { name: String },

    #[error("must be greater than 0")]
    NotPositive,

    #[error("not an http(s) URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("no provider is enabled")]
    NoEnabledProvider,

    #[error("placeholder for '{var}' was left unresolved")]
    UnresolvedPlaceholder { var: String },
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn missing(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::Missing)
    }

    pub fn not_positive(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::NotPositive)
    }

    pub fn invalid_url(field_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidUrl {
                reason: reason.into(),
            },
        )
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
