//! Mapbox Optimization API types
//!
//! v1 (`optimized-trips/v1`) solves a single trip over a coordinate list.
//! v2 (`optimized-trips/v2`) takes a routing problem document and answers
//! with one route per vehicle.

use serde::{Deserialize, Serialize};

/// Mapbox optimization v1 response
#[derive(Debug, Default, Deserialize)]
pub struct TripsResponse {
    /// `"Ok"` on success, otherwise an error code such as `"NoTrips"`
    #[serde(default)]
    pub code: String,

    pub message: Option<String>,

    #[serde(default)]
    pub trips: Vec<Trip>,

    #[serde(default)]
    pub waypoints: Vec<TripWaypoint>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Trip {
    #[serde(default)]
    pub distance: f64,

    /// Seconds, as a float
    #[serde(default)]
    pub duration: f64,

    /// Encoded polyline, precision 5
    pub geometry: Option<String>,
}

/// Input waypoint echoed back with its position in the optimized trip
#[derive(Debug, Default, Deserialize)]
pub struct TripWaypoint {
    pub waypoint_index: Option<usize>,
}

/// Mapbox optimization v2 routing problem document
#[derive(Debug, Clone, Serialize)]
pub struct RoutingProblem {
    pub version: u32,
    pub locations: Vec<Location>,
    pub vehicles: Vec<MapboxVehicle>,
    pub services: Vec<MapboxService>,
}

/// Named coordinate; vehicles and services refer to locations by name
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub name: String,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct MapboxVehicle {
    pub name: String,
    pub start_location: String,
    pub end_location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacities: Option<Capacities>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_end: Option<String>,
}

/// Capacity or size per unit; only `weight` is used
#[derive(Debug, Clone, Serialize)]
pub struct Capacities {
    pub weight: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapboxService {
    pub name: String,
    pub location: String,
    pub duration: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Capacities>,
}

/// Mapbox optimization v2 solution document
#[derive(Debug, Default, Deserialize)]
pub struct RoutingSolution {
    #[serde(default)]
    pub routes: Vec<SolutionRoute>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SolutionRoute {
    #[serde(default)]
    pub vehicle: String,

    #[serde(default)]
    pub stops: Vec<SolutionStop>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SolutionStop {
    /// `start`, `service`, `pickup`, `dropoff`, `break` or `end`
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub location: String,

    pub eta: Option<String>,

    /// Meters travelled by the vehicle when it reaches this stop
    #[serde(default)]
    pub odometer: f64,

    #[serde(default)]
    pub wait: u64,

    /// Time spent at the stop, seconds
    pub duration: Option<u64>,

    #[serde(default)]
    pub services: Vec<String>,
}

impl SolutionStop {
    /// Whether the stop performs a service rather than marking a route boundary
    pub fn is_service(&self) -> bool {
        !matches!(self.kind.as_str(), "start" | "end" | "break")
    }
}
