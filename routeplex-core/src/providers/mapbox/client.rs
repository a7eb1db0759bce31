//! Mapbox adapters over the Optimization API v1 and v2

use super::converter::{
    coordinate_path, from_routing_solution, from_trips_response, profile, to_routing_problem,
    to_trips_query,
};
use super::types::{RoutingSolution, TripsResponse};
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

/// Optimized trips through the Mapbox Optimization API v1
pub struct MapboxTripsProvider {
    settings: ProviderSettings,
    access_token: SecretString,
    transport: Arc<dyn HttpExecutor>,
}

impl MapboxTripsProvider {
    pub fn new(access_token: impl Into<SecretString>, transport: Arc<dyn HttpExecutor>) -> Self {
        Self {
            settings: ProviderSettings::for_kind(ProviderKind::MapboxTrips),
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
impl RouteProvider for MapboxTripsProvider {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn shape(&self) -> RequestShape {
        RequestShape::Simple
    }

    async fn optimize(&self, request: &RouteRequest) -> ProviderResult<RouteResponse> {
        let simple = expect_simple(self.name(), request)?;

        let path = format!(
            "/optimized-trips/v1/mapbox/{}/{}",
            profile(simple.travel_mode),
            coordinate_path(&simple.waypoints)
        );
        let call = VendorCall::get(self.settings.url(&path))
            .with_query_pairs(to_trips_query(simple))
            .with_query("access_token", self.access_token.expose_secret())
            .with_timeout(self.settings.timeout);

        debug!(
            provider = self.name(),
            request_id = %call.request_id,
            waypoints = simple.waypoints.len(),
            "Requesting optimized trip"
        );

        let raw = self.transport.execute(call).await.map_err(|e| self.fail(e))?;
        let response: TripsResponse = serde_json::from_value(raw).map_err(|e| self.fail(e))?;

        from_trips_response(response, self.name())
            .map(RouteResponse::Simple)
            .map_err(|e| self.fail(e))
    }
}

/// Fleet routing through the Mapbox Optimization API v2
pub struct MapboxFleetProvider {
    settings: ProviderSettings,
    access_token: SecretString,
    transport: Arc<dyn HttpExecutor>,
}

impl MapboxFleetProvider {
    pub fn new(access_token: impl Into<SecretString>, transport: Arc<dyn HttpExecutor>) -> Self {
        Self {
            settings: ProviderSettings::for_kind(ProviderKind::MapboxFleet),
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
impl RouteProvider for MapboxFleetProvider {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn shape(&self) -> RequestShape {
        RequestShape::Fleet
    }

    async fn optimize(&self, request: &RouteRequest) -> ProviderResult<RouteResponse> {
        let fleet = expect_fleet(self.name(), request)?;

        let body =
            serde_json::to_value(to_routing_problem(fleet)).map_err(|e| self.fail(e))?;
        let call = VendorCall::post(self.settings.url("/optimized-trips/v2"), body)
            .with_query("access_token", self.access_token.expose_secret())
            .with_timeout(self.settings.timeout);

        debug!(
            provider = self.name(),
            request_id = %call.request_id,
            vehicles = fleet.vehicles.len(),
            services = fleet.services.len(),
            "Requesting fleet optimisation"
        );

        let raw = self.transport.execute(call).await.map_err(|e| self.fail(e))?;
        let solution: RoutingSolution = serde_json::from_value(raw).map_err(|e| self.fail(e))?;

        from_routing_solution(solution, fleet, self.name())
            .map(RouteResponse::Fleet)
            .map_err(|e| self.fail(e))
    }
}
