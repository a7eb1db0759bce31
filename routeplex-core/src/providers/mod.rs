//! Route provider adapters and the composite orchestrator
//!
//! This module implements the provider abstraction layer that lets one
//! canonical request be answered by several routing vendors, with every
//! answer normalised into the same response model.

pub mod adapter;
pub mod composite;
pub mod error;
pub mod google;
pub mod mapbox;

pub use adapter::{parse_duration_secs, ProviderKind, ProviderSettings, RouteProvider, StopIndex};
pub use composite::{
    CompositeRouter, RouterBuilder, RoutingError, SelectionMetric, DEFAULT_MAX_CONCURRENCY,
};
pub use error::{FailureCause, ProviderError, ProviderResult};

// Re-export concrete providers
pub use google::{GoogleFleetProvider, GoogleRoutesProvider};
pub use mapbox::{MapboxFleetProvider, MapboxTripsProvider};
