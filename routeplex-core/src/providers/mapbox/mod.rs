//! Mapbox provider implementation
//!
//! Adapters for the Optimization API: v1 trips for point-to-point requests
//! and v2 routing problems for fleets.

mod client;
pub mod converter;
pub mod types;

pub use client::{MapboxFleetProvider, MapboxTripsProvider};
