//! Google adapters over the Routes and Route Optimization APIs

use super::converter::{
    from_compute_routes_response, from_optimize_tours_response, to_compute_routes_request,
    to_optimize_tours_request,
};
use super::types::{ComputeRoutesResponse, OptimizeToursResponse};
use crate::config::SecretString;
use crate::http::{HttpExecutor, VendorCall};
use crate::protocol::{RequestShape, RouteRequest, RouteResponse};
use crate::providers::adapter::{
    expect_fleet, expect_simple, ProviderKind, ProviderSettings, RouteProvider,
};
use crate::providers::error::{FailureCause, ProviderError, ProviderResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Fields requested from `computeRoutes`; the API rejects calls without a mask
const ROUTES_FIELD_MASK: &str = "routes.distanceMeters,routes.duration,\
routes.polyline.encodedPolyline,routes.optimizedIntermediateWaypointIndex";

/// Point-to-point routes through Google's Routes API
pub struct GoogleRoutesProvider {
    settings: ProviderSettings,
    api_key: SecretString,
    transport: Arc<dyn HttpExecutor>,
}

impl GoogleRoutesProvider {
    /// Create a provider with the default name, endpoint and timeout
    pub fn new(api_key: impl Into<SecretString>, transport: Arc<dyn HttpExecutor>) -> Self {
        Self {
            settings: ProviderSettings::for_kind(ProviderKind::GoogleRoutes),
            api_key: api_key.into(),
            transport,
        }
    }

    /// Override name, endpoint root or timeout
    pub fn with_settings(mut self, settings: ProviderSettings) -> Self {
        self.settings = settings;
        self
    }

    fn fail(&self, cause: impl Into<FailureCause>) -> ProviderError {
        ProviderError::new(self.settings.name.clone(), cause)
    }
}

#[async_trait]
impl RouteProvider for GoogleRoutesProvider {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn shape(&self) -> RequestShape {
        RequestShape::Simple
    }

    async fn optimize(&self, request: &RouteRequest) -> ProviderResult<RouteResponse> {
        let simple = expect_simple(self.name(), request)?;

        let body = serde_json::to_value(to_compute_routes_request(simple))
            .map_err(|e| self.fail(e))?;
        let call = VendorCall::post(self.settings.url("/directions/v2:computeRoutes"), body)
            .with_header("X-Goog-Api-Key", self.api_key.expose_secret())
            .with_header("X-Goog-FieldMask", ROUTES_FIELD_MASK)
            .with_timeout(self.settings.timeout);

        debug!(
            provider = self.name(),
            request_id = %call.request_id,
            waypoints = simple.waypoints.len(),
            "Requesting route"
        );

        let raw = self.transport.execute(call).await.map_err(|e| self.fail(e))?;
        let response: ComputeRoutesResponse =
            serde_json::from_value(raw).map_err(|e| self.fail(e))?;

        from_compute_routes_response(response, self.name())
            .map(RouteResponse::Simple)
            .map_err(|e| self.fail(e))
    }
}

/// Fleet tour optimisation through Google's Route Optimization API
pub struct GoogleFleetProvider {
    settings: ProviderSettings,
    project_id: String,
    access_token: SecretString,
    transport: Arc<dyn HttpExecutor>,
}

impl GoogleFleetProvider {
    /// Create a provider for a Cloud project, authenticated with an OAuth access token
    pub fn new(
        project_id: impl Into<String>,
        access_token: impl Into<SecretString>,
        transport: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self {
            settings: ProviderSettings::for_kind(ProviderKind::GoogleFleet),
            project_id: project_id.into(),
            access_token: access_token.into(),
            transport,
        }
    }

    /// Override name, endpoint root or timeout
    pub fn with_settings(mut self, settings: ProviderSettings) -> Self {
        self.settings = settings;
        self
    }

    fn fail(&self, cause: impl Into<FailureCause>) -> ProviderError {
        ProviderError::new(self.settings.name.clone(), cause)
    }
}

#[async_trait]
impl RouteProvider for GoogleFleetProvider {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn shape(&self) -> RequestShape {
        RequestShape::Fleet
    }

    async fn optimize(&self, request: &RouteRequest) -> ProviderResult<RouteResponse> {
        let fleet = expect_fleet(self.name(), request)?;

        let body = serde_json::to_value(to_optimize_tours_request(fleet))
            .map_err(|e| self.fail(e))?;
        let path = format!("/v1/projects/{}:optimizeTours", self.project_id);
        let call = VendorCall::post(self.settings.url(&path), body)
            .with_header(
                "Authorization",
                format!("Bearer {}", self.access_token.expose_secret()),
            )
            .with_timeout(self.settings.timeout);

        debug!(
            provider = self.name(),
            request_id = %call.request_id,
            vehicles = fleet.vehicles.len(),
            services = fleet.services.len(),
            "Requesting tour optimisation"
        );

        let raw = self.transport.execute(call).await.map_err(|e| self.fail(e))?;
        let response: OptimizeToursResponse =
            serde_json::from_value(raw).map_err(|e| self.fail(e))?;

        from_optimize_tours_response(response, fleet, self.name())
            .map(RouteResponse::Fleet)
            .map_err(|e| self.fail(e))
    }
}
