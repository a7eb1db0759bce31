//! HTTP transport for vendor calls
//!
//! This module implements the transport layer adapters talk to, handling:
//! - Connection pooling and client management
//! - Per-call timeouts and request ID correlation
//! - Mapping of non-2xx statuses and network failures to [`TransportError`]
//!
//! Adapters describe a call with [`VendorCall`] and receive the raw JSON
//! body; decoding into vendor types happens in the adapter.

pub mod client;
pub mod error;

pub use client::HttpClient;
pub use error::TransportError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Default timeout for single route lookups
pub const SIMPLE_ROUTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for multi-stop optimisation calls
pub const FLEET_ROUTE_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method of a vendor call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
}

/// A fully described vendor request
#[derive(Debug, Clone)]
pub struct VendorCall {
    pub method: Method,

    /// Absolute URL without query string
    pub url: String,

    /// Query parameters, appended in order
    pub query: Vec<(String, String)>,

    /// Extra request headers
    pub headers: Vec<(String, String)>,

    /// JSON body for POST calls
    pub body: Option<Value>,

    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Request timeout
    pub timeout: Duration,
}

impl VendorCall {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            request_id: Uuid::new_v4(),
            timeout: SIMPLE_ROUTE_TIMEOUT,
        }
    }

    /// Create a GET call with a generated request ID
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Create a POST call carrying a JSON body
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        let mut call = Self::new(Method::Post, url);
        call.body = Some(body);
        call
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trait for HTTP executors
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Execute a call and return the parsed JSON body
    async fn execute(&self, call: VendorCall) -> Result<Value, TransportError>;
}
