//! Provider adapter trait and shared normalisation helpers
//!
//! Defines the core abstraction for route vendors. Each adapter accepts one
//! request shape, calls its vendor through an [`HttpExecutor`] and maps the
//! vendor schema into the canonical [`RouteResponse`].
//!
//! [`HttpExecutor`]: crate::http::HttpExecutor

use crate::http::{FLEET_ROUTE_TIMEOUT, SIMPLE_ROUTE_TIMEOUT};
use crate::protocol::{
    Coordinate, FleetRouteRequest, RequestShape, RouteMetrics, RouteRequest, RouteResponse,
    ServicePoint, SimpleRouteRequest,
};
use crate::providers::error::{FailureCause, ProviderError, ProviderResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Core provider trait that all route vendors implement
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Get the provider's name
    fn name(&self) -> &str;

    /// Request shape this provider accepts
    fn shape(&self) -> RequestShape;

    /// Whether `request` can be handled by this provider
    fn accepts(&self, request: &RouteRequest) -> bool {
        request.shape() == self.shape()
    }

    /// Call the vendor and normalise its answer
    async fn optimize(&self, request: &RouteRequest) -> ProviderResult<RouteResponse>;
}

/// Vendor capability implemented by an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Routes API, point-to-point
    GoogleRoutes,
    /// Google Route Optimization API, fleet
    GoogleFleet,
    /// Mapbox Optimization API v1, point-to-point trips
    MapboxTrips,
    /// Mapbox Optimization API v2, fleet
    MapboxFleet,
}

impl ProviderKind {
    /// Request shape served by this kind
    pub fn shape(&self) -> RequestShape {
        match self {
            ProviderKind::GoogleRoutes | ProviderKind::MapboxTrips => RequestShape::Simple,
            ProviderKind::GoogleFleet | ProviderKind::MapboxFleet => RequestShape::Fleet,
        }
    }

    /// Name used when the configuration does not give one
    pub fn default_name(&self) -> &'static str {
        match self {
            ProviderKind::GoogleRoutes => "Google",
            ProviderKind::GoogleFleet => "GoogleFleet",
            ProviderKind::MapboxTrips => "Mapbox",
            ProviderKind::MapboxFleet => "MapboxFleet",
        }
    }

    /// Vendor API root used when the configuration does not give one
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::GoogleRoutes => "https://routes.googleapis.com",
            ProviderKind::GoogleFleet => "https://routeoptimization.googleapis.com",
            ProviderKind::MapboxTrips | ProviderKind::MapboxFleet => "https://api.mapbox.com",
        }
    }

    /// Per-call timeout: single routes are quick, tour optimisation is not
    pub fn default_timeout(&self) -> Duration {
        match self.shape() {
            RequestShape::Simple => SIMPLE_ROUTE_TIMEOUT,
            RequestShape::Fleet => FLEET_ROUTE_TIMEOUT,
        }
    }
}

/// Name, endpoint root and timeout shared by every adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub name: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Defaults for a vendor capability
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            name: kind.default_name().to_string(),
            base_url: kind.default_base_url().to_string(),
            timeout: kind.default_timeout(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join `path` onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Extract the simple variant or fail with `UnsupportedShape`
pub(crate) fn expect_simple<'a>(
    provider: &str,
    request: &'a RouteRequest,
) -> ProviderResult<&'a SimpleRouteRequest> {
    let simple = request
        .as_simple()
        .ok_or_else(|| unsupported(provider, RequestShape::Simple, request))?;
    simple
        .validate()
        .map_err(|msg| ProviderError::new(provider, FailureCause::InvalidRequest(msg)))?;
    Ok(simple)
}

/// Extract the fleet variant or fail with `UnsupportedShape`
pub(crate) fn expect_fleet<'a>(
    provider: &str,
    request: &'a RouteRequest,
) -> ProviderResult<&'a FleetRouteRequest> {
    let fleet = request
        .as_fleet()
        .ok_or_else(|| unsupported(provider, RequestShape::Fleet, request))?;
    fleet
        .validate()
        .map_err(|msg| ProviderError::new(provider, FailureCause::InvalidRequest(msg)))?;
    Ok(fleet)
}

fn unsupported(provider: &str, accepts: RequestShape, request: &RouteRequest) -> ProviderError {
    ProviderError::new(
        provider,
        FailureCause::UnsupportedShape {
            accepts,
            got: request.shape(),
        },
    )
}

/// Parse a protobuf-style duration such as `"1234s"` into whole seconds.
///
/// Missing, empty or non-numeric values yield 0. Fractional seconds are
/// truncated.
pub fn parse_duration_secs(duration: Option<&str>) -> u64 {
    let Some(raw) = duration else {
        return 0;
    };
    let digits = raw.trim().strip_suffix('s').unwrap_or(raw.trim());
    let whole = digits.split_once('.').map_or(digits, |(whole, _)| whole);
    whole.parse::<u64>().unwrap_or(0)
}

/// Vendor stop labels mapped back to the request's service points.
///
/// Vendors identify stops by label only, so locations and service
/// durations must come from the canonical request.
#[derive(Debug)]
pub struct StopIndex<'a> {
    services: HashMap<&'a str, &'a ServicePoint>,
}

impl<'a> StopIndex<'a> {
    pub fn new(request: &'a FleetRouteRequest) -> Self {
        Self {
            services: request
                .services
                .iter()
                .map(|service| (service.id.as_str(), service))
                .collect(),
        }
    }

    pub fn get(&self, service_id: &str) -> Option<&'a ServicePoint> {
        self.services.get(service_id).copied()
    }

    /// Location of a labelled stop, or `UnknownService`
    pub fn resolve(&self, service_id: &str) -> Result<&'a ServicePoint, FailureCause> {
        self.get(service_id)
            .ok_or_else(|| FailureCause::UnknownService(service_id.to_string()))
    }

    pub fn location(&self, service_id: &str) -> Result<Coordinate, FailureCause> {
        self.resolve(service_id).map(|service| service.location)
    }
}

/// Sum of two vendor-reported second counts; overflow is a parse failure
pub(crate) fn add_secs(a: u64, b: u64, field: &str) -> Result<u64, FailureCause> {
    a.checked_add(b)
        .ok_or_else(|| FailureCause::Parse(format!("{} out of range", field)))
}

/// Fleet-wide duration over all vehicle routes
pub(crate) fn total_duration_secs(vehicles: &[RouteMetrics]) -> Result<u64, FailureCause> {
    vehicles
        .iter()
        .try_fold(0, |total, v| add_secs(total, v.duration_secs, "total duration"))
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// `timestamp + secs`, or the unchanged timestamp when it does not parse
pub(crate) fn offset_timestamp(timestamp: &str, secs: u64) -> String {
    let Some(parsed) = parse_timestamp(timestamp) else {
        return timestamp.to_string();
    };
    let Ok(secs) = i64::try_from(secs) else {
        return timestamp.to_string();
    };
    ChronoDuration::try_seconds(secs)
        .and_then(|delta| parsed.checked_add_signed(delta))
        .map(|shifted| shifted.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_else(|| timestamp.to_string())
}

/// Whole seconds from `from` to `to`; 0 if either fails to parse or `to` is earlier
pub(crate) fn seconds_between(from: &str, to: &str) -> u64 {
    match (parse_timestamp(from), parse_timestamp(to)) {
        (Some(from), Some(to)) => u64::try_from((to - from).num_seconds()).unwrap_or(0),
        _ => 0,
    }
}
