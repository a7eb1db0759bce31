//! Canonical route request/response types
//!
//! Every provider translates to and from these structures. Two request
//! shapes coexist:
//! - `Simple`: an ordered list of waypoints for a point-to-point route
//! - `Fleet`: vehicles plus service points for multi-stop tour optimisation
//!
//! Responses mirror the same split. All values are immutable once built.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// Which request/response variant a value or provider deals with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestShape {
    /// Point-to-point route through ordered waypoints
    Simple,
    /// Multi-vehicle, multi-stop tour optimisation
    Fleet,
}

impl fmt::Display for RequestShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestShape::Simple => write!(f, "simple"),
            RequestShape::Fleet => write!(f, "fleet"),
        }
    }
}

/// Travel mode for point-to-point routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Cycling,
}

/// Point-to-point route request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRouteRequest {
    /// Ordered waypoints; first is the origin, last the destination
    pub waypoints: Vec<Coordinate>,

    /// Travel mode
    #[serde(default)]
    pub travel_mode: TravelMode,

    /// Let the vendor reorder intermediate waypoints
    #[serde(default)]
    pub optimize_order: bool,

    /// Return to the origin at the end of the route
    #[serde(default)]
    pub round_trip: bool,
}

impl SimpleRouteRequest {
    /// Create a driving request through the given waypoints
    pub fn new(waypoints: Vec<Coordinate>) -> Self {
        Self {
            waypoints,
            travel_mode: TravelMode::default(),
            optimize_order: false,
            round_trip: false,
        }
    }

    pub fn with_travel_mode(mut self, mode: TravelMode) -> Self {
        self.travel_mode = mode;
        self
    }

    pub fn with_optimized_order(mut self, enabled: bool) -> Self {
        self.optimize_order = enabled;
        self
    }

    pub fn with_round_trip(mut self, enabled: bool) -> Self {
        self.round_trip = enabled;
        self
    }

    /// First waypoint, if any
    pub fn origin(&self) -> Option<Coordinate> {
        self.waypoints.first().copied()
    }

    /// Last waypoint, if any
    pub fn destination(&self) -> Option<Coordinate> {
        self.waypoints.last().copied()
    }

    /// Waypoints strictly between origin and destination
    pub fn intermediates(&self) -> &[Coordinate] {
        if self.waypoints.len() <= 2 {
            return &[];
        }
        &self.waypoints[1..self.waypoints.len() - 1]
    }

    /// Check that the request describes an actual route
    pub fn validate(&self) -> Result<(), String> {
        if self.waypoints.len() < 2 {
            return Err(format!(
                "at least 2 waypoints are required, got {}",
                self.waypoints.len()
            ));
        }
        Ok(())
    }
}

/// A vehicle available to a fleet request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Identifier, unique within the request
    pub id: String,

    /// Where the vehicle starts
    pub start: Coordinate,

    /// Where the vehicle must finish
    pub end: Coordinate,

    /// Earliest start (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// Latest end (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    /// Load capacity; non-positive input becomes the unconstrained sentinel
    #[serde(default = "default_capacity", deserialize_with = "deserialize_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 {
    Vehicle::UNCONSTRAINED_CAPACITY
}

fn deserialize_capacity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(Vehicle::normalize_capacity)
}

impl Vehicle {
    /// Capacity used when none (or a non-positive one) is supplied
    pub const UNCONSTRAINED_CAPACITY: u32 = 1000;

    /// Create a vehicle without time windows and with the default capacity
    pub fn new(id: impl Into<String>, start: Coordinate, end: Coordinate) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            start_time: None,
            end_time: None,
            capacity: Self::UNCONSTRAINED_CAPACITY,
        }
    }

    /// Set the time window
    pub fn with_time_window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    /// Set the capacity; values <= 0 fall back to the unconstrained sentinel
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Self::normalize_capacity(capacity);
        self
    }

    /// Capacity as sent to vendors; a zero written straight into the field
    /// is unconstrained too
    pub fn effective_capacity(&self) -> u32 {
        Self::normalize_capacity(i64::from(self.capacity))
    }

    fn normalize_capacity(capacity: i64) -> u32 {
        if capacity <= 0 {
            Self::UNCONSTRAINED_CAPACITY
        } else {
            u32::try_from(capacity).unwrap_or(u32::MAX)
        }
    }
}

/// A stop that must be visited by some vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePoint {
    /// Identifier, unique within the request
    pub id: String,

    /// Where the service happens
    pub location: Coordinate,

    /// Time spent on site, in seconds
    #[serde(default = "default_service_duration")]
    pub duration_secs: u32,

    /// Load consumed; non-positive disables capacity accounting for the stop
    #[serde(default = "default_demand")]
    pub demand: i32,
}

fn default_service_duration() -> u32 {
    ServicePoint::DEFAULT_DURATION_SECS
}

fn default_demand() -> i32 {
    ServicePoint::DEFAULT_DEMAND
}

impl ServicePoint {
    pub const DEFAULT_DURATION_SECS: u32 = 300;
    pub const DEFAULT_DEMAND: i32 = 10;

    pub fn new(id: impl Into<String>, location: Coordinate) -> Self {
        Self {
            id: id.into(),
            location,
            duration_secs: Self::DEFAULT_DURATION_SECS,
            demand: Self::DEFAULT_DEMAND,
        }
    }

    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn with_demand(mut self, demand: i32) -> Self {
        self.demand = demand;
        self
    }

    /// Whether this stop counts against vehicle capacity
    pub fn has_demand(&self) -> bool {
        self.demand > 0
    }
}

/// Multi-vehicle tour optimisation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRouteRequest {
    pub vehicles: Vec<Vehicle>,
    pub services: Vec<ServicePoint>,

    /// Global time window start (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_start_time: Option<String>,

    /// Global time window end (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_end_time: Option<String>,
}

impl FleetRouteRequest {
    pub fn new(vehicles: Vec<Vehicle>, services: Vec<ServicePoint>) -> Self {
        Self {
            vehicles,
            services,
            global_start_time: None,
            global_end_time: None,
        }
    }

    /// One vehicle (`vehicle-1`) leaving from and returning to `start`
    pub fn single_vehicle(start: Coordinate, services: Vec<ServicePoint>) -> Self {
        Self::new(vec![Vehicle::new("vehicle-1", start, start)], services)
    }

    pub fn with_global_window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.global_start_time = Some(start.into());
        self.global_end_time = Some(end.into());
        self
    }

    /// Look up a service point by id
    pub fn service(&self, id: &str) -> Option<&ServicePoint> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Check emptiness and id uniqueness
    pub fn validate(&self) -> Result<(), String> {
        if self.vehicles.is_empty() {
            return Err("at least one vehicle is required".to_string());
        }
        if self.services.is_empty() {
            return Err("at least one service point is required".to_string());
        }

        let mut seen = HashSet::new();
        for vehicle in &self.vehicles {
            if !seen.insert(vehicle.id.as_str()) {
                return Err(format!("duplicate vehicle id '{}'", vehicle.id));
            }
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.id.as_str()) {
                return Err(format!("duplicate service id '{}'", service.id));
            }
        }

        Ok(())
    }
}

/// Canonical route request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum RouteRequest {
    Simple(SimpleRouteRequest),
    Fleet(FleetRouteRequest),
}

impl RouteRequest {
    pub fn shape(&self) -> RequestShape {
        match self {
            RouteRequest::Simple(_) => RequestShape::Simple,
            RouteRequest::Fleet(_) => RequestShape::Fleet,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleRouteRequest> {
        match self {
            RouteRequest::Simple(request) => Some(request),
            RouteRequest::Fleet(_) => None,
        }
    }

    pub fn as_fleet(&self) -> Option<&FleetRouteRequest> {
        match self {
            RouteRequest::Fleet(request) => Some(request),
            RouteRequest::Simple(_) => None,
        }
    }
}

impl From<SimpleRouteRequest> for RouteRequest {
    fn from(request: SimpleRouteRequest) -> Self {
        RouteRequest::Simple(request)
    }
}

impl From<FleetRouteRequest> for RouteRequest {
    fn from(request: FleetRouteRequest) -> Self {
        RouteRequest::Fleet(request)
    }
}

/// Point-to-point route result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResponse {
    pub distance_meters: f64,
    pub duration_secs: u64,

    /// Decoded route geometry
    pub path: Vec<Coordinate>,

    /// Vendor-chosen visiting order of the waypoints, empty if not reported
    pub optimized_order: Vec<usize>,

    /// Name of the provider that produced this result
    pub provider: String,
}

/// A single visit on a vehicle itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedStop {
    /// Vehicle serving this stop
    pub vehicle_id: String,

    /// Service point id
    pub service_id: String,

    /// Location of the service point
    pub location: Coordinate,

    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,

    /// Time spent waiting before service could start
    pub wait_secs: u64,

    /// Distance from the previous stop on the same vehicle (0 for the first)
    pub distance_from_previous: f64,

    /// Travel time from the previous stop on the same vehicle (0 for the first)
    pub travel_secs_from_previous: u64,
}

/// Summary of one vehicle's leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub vehicle_id: String,
    pub distance_meters: f64,
    pub duration_secs: u64,
    pub services_performed: u32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Multi-stop optimisation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetResponse {
    /// Sum over all vehicles
    pub distance_meters: f64,

    /// Sum over all vehicles
    pub duration_secs: u64,

    /// Stops in itinerary order, grouped by vehicle
    pub stops: Vec<OptimizedStop>,

    pub vehicles: Vec<RouteMetrics>,

    pub provider: String,
}

impl FleetResponse {
    /// Stops served by one vehicle, in visiting order
    pub fn itinerary<'a>(&'a self, vehicle_id: &'a str) -> impl Iterator<Item = &'a OptimizedStop> + 'a {
        self.stops.iter().filter(move |stop| stop.vehicle_id == vehicle_id)
    }
}

/// Canonical route response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum RouteResponse {
    Simple(PathResponse),
    Fleet(FleetResponse),
}

impl RouteResponse {
    pub fn shape(&self) -> RequestShape {
        match self {
            RouteResponse::Simple(_) => RequestShape::Simple,
            RouteResponse::Fleet(_) => RequestShape::Fleet,
        }
    }

    pub fn distance_meters(&self) -> f64 {
        match self {
            RouteResponse::Simple(r) => r.distance_meters,
            RouteResponse::Fleet(r) => r.distance_meters,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        match self {
            RouteResponse::Simple(r) => r.duration_secs,
            RouteResponse::Fleet(r) => r.duration_secs,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            RouteResponse::Simple(r) => &r.provider,
            RouteResponse::Fleet(r) => &r.provider,
        }
    }

    pub fn as_simple(&self) -> Option<&PathResponse> {
        match self {
            RouteResponse::Simple(r) => Some(r),
            RouteResponse::Fleet(_) => None,
        }
    }

    pub fn as_fleet(&self) -> Option<&FleetResponse> {
        match self {
            RouteResponse::Fleet(r) => Some(r),
            RouteResponse::Simple(_) => None,
        }
    }
}
