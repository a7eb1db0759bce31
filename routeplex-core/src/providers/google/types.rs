//! Google Routes and Route Optimization API types
//!
//! These types match the JSON mapping of Google's protobuf messages. Zero
//! values are omitted on the wire, so almost every response field is
//! optional or defaulted.

use serde::{Deserialize, Serialize};

/// `{"latitude": .., "longitude": ..}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoogleLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// `{"latLng": {..}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLocation {
    pub lat_lng: GoogleLatLng,
}

/// Routes API waypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleWaypoint {
    pub location: GoogleLocation,
}

/// `directions/v2:computeRoutes` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRoutesRequest {
    pub origin: GoogleWaypoint,
    pub destination: GoogleWaypoint,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub intermediates: Vec<GoogleWaypoint>,

    pub travel_mode: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_preference: Option<&'static str>,

    pub optimize_waypoint_order: bool,
}

/// `directions/v2:computeRoutes` response body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRoutesResponse {
    #[serde(default)]
    pub routes: Vec<GoogleRoute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRoute {
    #[serde(default)]
    pub distance_meters: f64,

    /// Duration string such as `"1234s"`
    pub duration: Option<String>,

    pub polyline: Option<GooglePolyline>,

    pub optimized_intermediate_waypoint_index: Option<Vec<usize>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePolyline {
    pub encoded_polyline: Option<String>,
}

/// `:optimizeTours` request body
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeToursRequest {
    pub model: ShipmentModel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentModel {
    pub shipments: Vec<Shipment>,
    pub vehicles: Vec<GoogleVehicle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub label: String,
    pub deliveries: Vec<VisitRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_demands: Option<LoadMap<LoadAmount>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    pub arrival_location: GoogleLatLng,
    pub duration: String,
}

/// Load keyed by unit; only `weight` is used
#[derive(Debug, Clone, Serialize)]
pub struct LoadMap<T> {
    pub weight: T,
}

/// int64 values are strings in Google's JSON mapping
#[derive(Debug, Clone, Serialize)]
pub struct LoadAmount {
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadLimit {
    pub max_load: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleVehicle {
    pub label: String,
    pub start_location: GoogleLatLng,
    pub end_location: GoogleLatLng,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_limits: Option<LoadMap<LoadLimit>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub start_time_windows: Vec<TimeWindow>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub end_time_windows: Vec<TimeWindow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// `:optimizeTours` response body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeToursResponse {
    #[serde(default)]
    pub routes: Vec<ShipmentRoute>,
}

/// Itinerary of one vehicle
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRoute {
    pub vehicle_index: Option<usize>,
    pub vehicle_label: Option<String>,
    pub vehicle_start_time: Option<String>,
    pub vehicle_end_time: Option<String>,

    #[serde(default)]
    pub visits: Vec<Visit>,

    /// `transitions[i]` leads into `visits[i]`; one extra trailing entry
    /// leads to the vehicle's end location
    #[serde(default)]
    pub transitions: Vec<Transition>,

    pub metrics: Option<AggregatedMetrics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub shipment_index: Option<usize>,
    pub shipment_label: Option<String>,
    pub start_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub travel_duration: Option<String>,

    #[serde(default)]
    pub travel_distance_meters: f64,

    pub wait_duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMetrics {
    pub performed_shipment_count: Option<u32>,
    pub travel_duration: Option<String>,

    #[serde(default)]
    pub travel_distance_meters: f64,
}
