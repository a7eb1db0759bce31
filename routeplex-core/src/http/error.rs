//! HTTP error mapping utilities

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the vendor transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// Vendor answered with a non-2xx status
    #[error("HTTP {status}: {message} [request_id: {request_id}]")]
    Status {
        status: u16,
        /// Best-effort message extracted from the body
        message: String,
        /// Raw response body as returned by the vendor
        body: Option<String>,
        request_id: Uuid,
    },

    /// Request did not complete within its timeout
    #[error("request timed out [request_id: {request_id}]")]
    Timeout { request_id: Uuid },

    /// Connection or protocol failure
    #[error("network error: {message} [request_id: {request_id}]")]
    Network { message: String, request_id: Uuid },

    /// Response body could not be used
    #[error("invalid response: {message} [request_id: {request_id}]")]
    InvalidResponse { message: String, request_id: Uuid },

    /// URL or client construction failure
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// HTTP status of the vendor reply, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw vendor error body, if there was one
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

/// Map HTTP status code and response body to a TransportError
pub fn map_http_error(status: StatusCode, body: Option<String>, request_id: Uuid) -> TransportError {
    let message = body
        .as_ref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_message(&v))
        .or_else(|| body.clone().filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()))
        });

    TransportError::Status {
        status: status.as_u16(),
        message,
        body,
        request_id,
    }
}

/// Extract error message from JSON response
fn extract_error_message(json: &Value) -> Option<String> {
    // Google format: { "error": { "code": 400, "message": "...", "status": "..." } }
    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
    {
        return Some(message.to_string());
    }

    // Mapbox format: { "message": "...", "code": "..." }
    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(message.to_string());
    }

    if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
        return Some(error.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_error_body() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        let err = map_http_error(StatusCode::FORBIDDEN, Some(body.to_string()), Uuid::new_v4());

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.body(), Some(body));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_mapbox_error_body() {
        let body = r#"{"message":"Not Authorized - Invalid Token","code":"InvalidToken"}"#;
        let err = map_http_error(StatusCode::UNAUTHORIZED, Some(body.to_string()), Uuid::new_v4());
        assert!(err.to_string().contains("Invalid Token"));
    }

    #[test]
    fn test_plain_text_and_empty_bodies() {
        let err = map_http_error(
            StatusCode::BAD_GATEWAY,
            Some("upstream down".to_string()),
            Uuid::new_v4(),
        );
        assert!(err.to_string().contains("upstream down"));

        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, None, Uuid::new_v4());
        assert!(err.to_string().contains("Service Unavailable"));
        assert_eq!(err.body(), None);
    }
}
