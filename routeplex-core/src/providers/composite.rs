//! Multi-provider orchestration
//!
//! [`CompositeRouter`] fans a request out to every registered provider that
//! accepts its shape and either picks the best answer, returns all of them,
//! or forwards to a single provider by name. Concurrency is bounded by a
//! semaphore owned by the router and shared by all of its calls.

use crate::config::{ConfigError, ProviderConfig, RouteplexConfig};
use crate::http::{HttpClient, HttpExecutor};
use crate::protocol::{RouteRequest, RouteResponse};
use crate::providers::adapter::{ProviderKind, RouteProvider};
use crate::providers::error::{FailureCause, ProviderError, ProviderResult};
use crate::providers::google::{GoogleFleetProvider, GoogleRoutesProvider};
use crate::providers::mapbox::{MapboxFleetProvider, MapboxTripsProvider};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Default size of the router's worker pool
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Quantity minimised when choosing the best route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMetric {
    /// Total travel time
    #[default]
    Duration,
    /// Total distance
    Distance,
}

impl SelectionMetric {
    /// Order two responses by this metric
    pub fn compare(&self, a: &RouteResponse, b: &RouteResponse) -> Ordering {
        match self {
            SelectionMetric::Duration => a.duration_secs().cmp(&b.duration_secs()),
            SelectionMetric::Distance => a.distance_meters().total_cmp(&b.distance_meters()),
        }
    }
}

impl fmt::Display for SelectionMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMetric::Duration => write!(f, "duration"),
            SelectionMetric::Distance => write!(f, "distance"),
        }
    }
}

/// Errors returned by [`CompositeRouter`]
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Every eligible provider failed, or none accepted the request
    #[error("no routes available ({} provider(s) failed)", .failures.len())]
    NoRoutesAvailable { failures: Vec<ProviderError> },

    /// `select_named` was given a name that is not registered
    #[error("provider '{name}' not found")]
    ProviderNotFound { name: String },

    /// The named provider failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Fans requests out over a fixed set of providers
pub struct CompositeRouter {
    providers: Vec<Arc<dyn RouteProvider>>,
    metric: SelectionMetric,
    pool: Arc<Semaphore>,
    max_concurrency: usize,
}

impl fmt::Debug for CompositeRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRouter")
            .field("providers", &self.providers())
            .field("metric", &self.metric)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl CompositeRouter {
    /// Create a router with the default metric and pool size
    pub fn new(providers: Vec<Arc<dyn RouteProvider>>) -> Self {
        RouterBuilder::new().providers(providers).build()
    }

    /// Start building a router
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Build the enabled providers of a configuration over one shared HTTP client
    pub fn from_config(config: &RouteplexConfig) -> Result<Self, ConfigError> {
        let transport: Arc<dyn HttpExecutor> = Arc::new(HttpClient::new()?);
        Self::from_config_with_transport(config, transport)
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied transport
    pub fn from_config_with_transport(
        config: &RouteplexConfig,
        transport: Arc<dyn HttpExecutor>,
    ) -> Result<Self, ConfigError> {
        let mut builder = RouterBuilder::new()
            .metric(config.selection.metric)
            .max_concurrency(config.selection.max_concurrency);

        for provider in config.providers.iter().filter(|p| p.enabled) {
            builder = builder.provider(build_provider(provider, Arc::clone(&transport))?);
        }

        Ok(builder.build())
    }

    /// Registered provider names in registration order
    pub fn providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Metric used by [`select_best`](Self::select_best)
    pub fn metric(&self) -> SelectionMetric {
        self.metric
    }

    /// Query every accepting provider and return the best route by the
    /// configured metric
    pub async fn select_best(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError> {
        self.select_best_with(request, self.metric).await
    }

    /// Query every accepting provider and return the best route by `metric`.
    ///
    /// Ties go to the provider registered first. Failed providers are
    /// logged and skipped; if none succeeds, all failures are returned.
    pub async fn select_best_with(
        &self,
        request: &RouteRequest,
        metric: SelectionMetric,
    ) -> Result<RouteResponse, RoutingError> {
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for outcome in self.fan_out(request).await {
            match outcome {
                Ok(response) => successes.push(response),
                Err(err) => failures.push(err),
            }
        }

        // min_by keeps the first of equal elements
        let best = successes.into_iter().min_by(|a, b| metric.compare(a, b));

        match best {
            Some(response) => {
                info!(
                    provider = response.provider(),
                    %metric,
                    distance_meters = response.distance_meters(),
                    duration_secs = response.duration_secs(),
                    failed = failures.len(),
                    "Selected best route"
                );
                Ok(response)
            }
            None => {
                warn!(failed = failures.len(), shape = %request.shape(), "No provider returned a route");
                Err(RoutingError::NoRoutesAvailable { failures })
            }
        }
    }

    /// Forward the request to one provider, matched case-insensitively
    pub async fn select_named(
        &self,
        name: &str,
        request: &RouteRequest,
    ) -> Result<RouteResponse, RoutingError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| RoutingError::ProviderNotFound {
                name: name.to_string(),
            })?;

        debug!(provider = provider.name(), "Routing to named provider");
        Ok(provider.optimize(request).await?)
    }

    /// Query every accepting provider and return all successful routes in
    /// registration order
    pub async fn compare_all(&self, request: &RouteRequest) -> Vec<RouteResponse> {
        self.fan_out(request)
            .await
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }

    /// Run every accepting provider concurrently and collect the outcomes
    /// in registration order. Failures are logged here.
    async fn fan_out(&self, request: &RouteRequest) -> Vec<ProviderResult<RouteResponse>> {
        let shared = Arc::new(request.clone());
        let mut handles = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            if !provider.accepts(request) {
                debug!(provider = provider.name(), shape = %request.shape(), "Skipping provider");
                continue;
            }

            let name = provider.name().to_string();
            let provider = Arc::clone(provider);
            let request = Arc::clone(&shared);
            let pool = Arc::clone(&self.pool);

            let handle = tokio::spawn(async move {
                let Ok(_permit) = pool.acquire_owned().await else {
                    return Err(ProviderError::new(
                        provider.name(),
                        FailureCause::TaskFailed("worker pool closed".to_string()),
                    ));
                };

                let started = Instant::now();
                let outcome = provider.optimize(&request).await;
                debug!(
                    provider = provider.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = outcome.is_ok(),
                    "Provider finished"
                );
                outcome
            });
            handles.push((name, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(ProviderError::new(
                    name,
                    FailureCause::TaskFailed(join_err.to_string()),
                )),
            };
            if let Err(err) = &outcome {
                warn!(provider = %err.provider, error = %err.cause, "Provider failed");
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Builder for [`CompositeRouter`]
pub struct RouterBuilder {
    providers: Vec<Arc<dyn RouteProvider>>,
    metric: SelectionMetric,
    max_concurrency: usize,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            metric: SelectionMetric::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Register a provider; registration order breaks ties
    pub fn provider(mut self, provider: Arc<dyn RouteProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(mut self, providers: impl IntoIterator<Item = Arc<dyn RouteProvider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    pub fn metric(mut self, metric: SelectionMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Upper bound on provider calls in flight; at least 1
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn build(self) -> CompositeRouter {
        CompositeRouter {
            providers: self.providers,
            metric: self.metric,
            pool: Arc::new(Semaphore::new(self.max_concurrency)),
            max_concurrency: self.max_concurrency,
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_provider(
    config: &ProviderConfig,
    transport: Arc<dyn HttpExecutor>,
) -> Result<Arc<dyn RouteProvider>, ConfigError> {
    let settings = config.settings();
    let key = config.api_key.clone();

    let provider: Arc<dyn RouteProvider> = match config.kind {
        ProviderKind::GoogleRoutes => {
            Arc::new(GoogleRoutesProvider::new(key, transport).with_settings(settings))
        }
        ProviderKind::GoogleFleet => {
            let project_id = config.project_id.clone().ok_or_else(|| ConfigError::Invalid {
                message: format!("provider '{}' needs a project_id", settings.name),
            })?;
            Arc::new(GoogleFleetProvider::new(project_id, key, transport).with_settings(settings))
        }
        ProviderKind::MapboxTrips => {
            Arc::new(MapboxTripsProvider::new(key, transport).with_settings(settings))
        }
        ProviderKind::MapboxFleet => {
            Arc::new(MapboxFleetProvider::new(key, transport).with_settings(settings))
        }
    };
    Ok(provider)
}
