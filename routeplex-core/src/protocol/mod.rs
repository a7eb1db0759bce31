//! Protocol module for route request/response structures
//!
//! This module defines the canonical, provider-agnostic data model every
//! vendor adapter translates to and from.

pub mod types;

pub use types::{
    Coordinate, FleetResponse, FleetRouteRequest, OptimizedStop, PathResponse, RequestShape,
    RouteMetrics, RouteRequest, RouteResponse, ServicePoint, SimpleRouteRequest, TravelMode,
    Vehicle,
};
