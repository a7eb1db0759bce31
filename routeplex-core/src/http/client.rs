//! HTTP client implementation using reqwest

use crate::http::error::{map_http_error, TransportError};
use crate::http::{HttpExecutor, Method, VendorCall};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("routeplex/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_response_size", &self.max_response_size)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(Duration::from_secs(10), 10)
    }

    /// Create a new HTTP client with custom configuration
    ///
    /// Request timeouts are set per call from [`VendorCall::timeout`].
    pub fn with_config(
        connect_timeout: Duration,
        max_idle_per_host: usize,
    ) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| {
                TransportError::InvalidRequest(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Validate response content type
    fn validate_content_type(response: &Response, request_id: Uuid) -> Result<(), TransportError> {
        if let Some(content_type) = response.headers().get("content-type") {
            let content_type_str = content_type.to_str().unwrap_or("").to_lowercase();

            if !content_type_str.contains("json") {
                return Err(TransportError::InvalidResponse {
                    message: format!("Expected JSON, got: {}", content_type_str),
                    request_id,
                });
            }
        }

        Ok(())
    }

    /// Check response size to prevent OOM
    fn check_content_length(
        &self,
        response: &Response,
        request_id: Uuid,
    ) -> Result<(), TransportError> {
        if let Some(content_length) = response.content_length() {
            if content_length > self.max_response_size as u64 {
                return Err(TransportError::InvalidResponse {
                    message: format!(
                        "Response size {} exceeds maximum {}",
                        content_length, self.max_response_size
                    ),
                    request_id,
                });
            }
        }

        Ok(())
    }

    fn map_send_error(err: reqwest::Error, url: &str, request_id: Uuid) -> TransportError {
        if err.is_timeout() {
            warn!(%url, %request_id, "Request timeout");
            TransportError::Timeout { request_id }
        } else if err.is_connect() {
            error!(%url, %request_id, error = %err, "Connection error");
            TransportError::Network {
                message: format!("Connection failed: {}", err),
                request_id,
            }
        } else {
            error!(%url, %request_id, error = %err, "Request error");
            TransportError::Network {
                message: err.to_string(),
                request_id,
            }
        }
    }
}

#[async_trait]
impl HttpExecutor for HttpClient {
    async fn execute(&self, call: VendorCall) -> Result<Value, TransportError> {
        let request_id = call.request_id;
        let url = reqwest::Url::parse(&call.url)
            .map_err(|e| TransportError::InvalidRequest(format!("Invalid URL '{}': {}", call.url, e)))?;

        // Only log host and path; query strings may carry access tokens
        info!(
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            %request_id,
            "Executing vendor request"
        );

        let mut req_builder = match call.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        }
        .timeout(call.timeout);

        if !call.query.is_empty() {
            req_builder = req_builder.query(&call.query);
        }

        for (key, value) in &call.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        // Add request ID header for correlation
        req_builder = req_builder.header("X-Request-ID", request_id.to_string());

        if let Some(ref body) = call.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, url.path(), request_id))?;

        let status = response.status();
        debug!(%status, %request_id, "Response status");

        // Check for non-success status codes
        if !status.is_success() {
            let body = response.text().await.ok();

            warn!(%status, path = url.path(), %request_id, "Vendor request failed");

            return Err(map_http_error(status, body, request_id));
        }

        Self::validate_content_type(&response, request_id)?;
        self.check_content_length(&response, request_id)?;

        let response_text = response
            .text()
            .await
            .map_err(|e| TransportError::Network {
                message: format!("Failed to read response body: {}", e),
                request_id,
            })?;

        // Check response size after reading
        if response_text.len() > self.max_response_size {
            return Err(TransportError::InvalidResponse {
                message: format!(
                    "Response size {} exceeds maximum {}",
                    response_text.len(),
                    self.max_response_size
                ),
                request_id,
            });
        }

        let value: Value = serde_json::from_str(&response_text).map_err(|e| {
            error!(%request_id, error = %e, "Failed to parse vendor response");
            TransportError::InvalidResponse {
                message: format!("Invalid JSON: {}", e),
                request_id,
            }
        })?;

        info!(%request_id, "Vendor request completed");

        Ok(value)
    }
}
