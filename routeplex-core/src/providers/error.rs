//! Provider error types and handling

use crate::http::TransportError;
use crate::polyline::DecodeError;
use crate::protocol::RequestShape;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A provider call or normalisation failed
#[derive(Debug, Error)]
#[error("provider {provider} failed: {cause}")]
pub struct ProviderError {
    /// Name of the failing provider
    pub provider: String,

    /// What went wrong
    #[source]
    pub cause: FailureCause,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, cause: impl Into<FailureCause>) -> Self {
        Self {
            provider: provider.into(),
            cause: cause.into(),
        }
    }
}

/// Why a provider failed
#[derive(Debug, Error)]
pub enum FailureCause {
    /// Vendor call failed at the transport level
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Route geometry could not be decoded
    #[error("geometry decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Raw vendor response did not match the expected schema
    #[error("unexpected response format: {0}")]
    Parse(String),

    /// A required field was absent from the vendor response
    #[error("missing field '{0}' in vendor response")]
    MissingField(String),

    /// Vendor referenced a stop that was not part of the request
    #[error("vendor returned unknown service '{0}'")]
    UnknownService(String),

    /// Vendor reported an error inside a 2xx response
    #[error("vendor error {code}: {message}")]
    Vendor { code: String, message: String },

    /// Request cannot be sent to this vendor
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request shape not handled by this provider
    #[error("{got} requests are not supported (accepts {accepts})")]
    UnsupportedShape {
        accepts: RequestShape,
        got: RequestShape,
    },

    /// The task running the provider call panicked or was aborted
    #[error("provider task failed: {0}")]
    TaskFailed(String),
}

impl From<serde_json::Error> for FailureCause {
    fn from(err: serde_json::Error) -> Self {
        FailureCause::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_decode_error_in_source_chain() {
        let err = ProviderError::new("Google", DecodeError::Truncated { offset: 7 });
        assert_eq!(err.provider, "Google");

        let cause = err.source().unwrap();
        let decode = cause.source().unwrap().downcast_ref::<DecodeError>();
        assert_eq!(decode, Some(&DecodeError::Truncated { offset: 7 }));
    }

    #[test]
    fn test_display() {
        let err = ProviderError::new(
            "Mapbox",
            FailureCause::UnsupportedShape {
                accepts: RequestShape::Simple,
                got: RequestShape::Fleet,
            },
        );
        assert_eq!(
            err.to_string(),
            "provider Mapbox failed: fleet requests are not supported (accepts simple)"
        );
    }
}
