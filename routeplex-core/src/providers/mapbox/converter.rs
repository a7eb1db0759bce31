//! Conversion between the canonical model and Mapbox formats

use super::types::*;
use crate::polyline::{self, DEFAULT_PRECISION};
use crate::protocol::{
    Coordinate, FleetResponse, FleetRouteRequest, OptimizedStop, PathResponse, RouteMetrics,
    SimpleRouteRequest, TravelMode,
};
use crate::providers::adapter::{
    add_secs, offset_timestamp, seconds_between, total_duration_secs, StopIndex,
};
use crate::providers::error::FailureCause;

/// Status code of a successful v1 response
const CODE_OK: &str = "Ok";

/// Mapbox routing profile for a travel mode
pub fn profile(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Driving => "driving",
        TravelMode::Walking => "walking",
        TravelMode::Cycling => "cycling",
    }
}

/// `lng,lat;lng,lat;...` path segment, six decimal places
pub fn coordinate_path(waypoints: &[Coordinate]) -> String {
    waypoints
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.lng, c.lat))
        .collect::<Vec<_>>()
        .join(";")
}

/// Query parameters for a v1 trip, excluding the access token.
///
/// A round trip lets Mapbox pick the start and end; otherwise the first and
/// last waypoints are pinned.
pub fn to_trips_query(request: &SimpleRouteRequest) -> Vec<(String, String)> {
    let (source, destination) = if request.round_trip {
        ("any", "any")
    } else {
        ("first", "last")
    };

    [
        ("geometries", "polyline"),
        ("steps", "false"),
        ("overview", "full"),
        ("source", source),
        ("destination", destination),
        ("roundtrip", if request.round_trip { "true" } else { "false" }),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Convert a v1 response into a canonical path
pub fn from_trips_response(
    response: TripsResponse,
    provider: &str,
) -> Result<PathResponse, FailureCause> {
    if response.code != CODE_OK {
        return Err(FailureCause::Vendor {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let trip = response
        .trips
        .into_iter()
        .next()
        .ok_or_else(|| FailureCause::MissingField("trips".to_string()))?;

    let path = polyline::decode(trip.geometry.as_deref(), DEFAULT_PRECISION)?;

    Ok(PathResponse {
        distance_meters: trip.distance,
        duration_secs: trip.duration.max(0.0).round() as u64,
        path,
        optimized_order: response
            .waypoints
            .iter()
            .filter_map(|w| w.waypoint_index)
            .collect(),
        provider: provider.to_string(),
    })
}

fn location(name: String, coordinate: Coordinate) -> Location {
    Location {
        name,
        coordinates: [coordinate.lng, coordinate.lat],
    }
}

fn start_location(vehicle_id: &str) -> String {
    format!("start-{vehicle_id}")
}

fn end_location(vehicle_id: &str) -> String {
    format!("end-{vehicle_id}")
}

/// Convert a fleet request into a v2 routing problem.
///
/// Services are located under their own id, vehicle endpoints under
/// `start-{id}` and `end-{id}`.
pub fn to_routing_problem(request: &FleetRouteRequest) -> RoutingProblem {
    let mut locations = Vec::with_capacity(request.services.len() + 2 * request.vehicles.len());

    let vehicles = request
        .vehicles
        .iter()
        .map(|vehicle| {
            let start = start_location(&vehicle.id);
            let end = end_location(&vehicle.id);
            locations.push(location(start.clone(), vehicle.start));
            locations.push(location(end.clone(), vehicle.end));

            MapboxVehicle {
                name: vehicle.id.clone(),
                start_location: start,
                end_location: end,
                capacities: Some(Capacities {
                    weight: u64::from(vehicle.effective_capacity()),
                }),
                earliest_start: vehicle
                    .start_time
                    .clone()
                    .or_else(|| request.global_start_time.clone()),
                latest_end: vehicle
                    .end_time
                    .clone()
                    .or_else(|| request.global_end_time.clone()),
            }
        })
        .collect();

    let services = request
        .services
        .iter()
        .map(|service| {
            locations.push(location(service.id.clone(), service.location));
            MapboxService {
                name: service.id.clone(),
                location: service.id.clone(),
                duration: service.duration_secs,
                size: u64::try_from(service.demand)
                    .ok()
                    .filter(|&weight| weight > 0)
                    .map(|weight| Capacities { weight }),
            }
        })
        .collect();

    RoutingProblem {
        version: 1,
        locations,
        vehicles,
        services,
    }
}

/// Convert a v2 solution into a canonical fleet result
pub fn from_routing_solution(
    solution: RoutingSolution,
    request: &FleetRouteRequest,
    provider: &str,
) -> Result<FleetResponse, FailureCause> {
    let index = StopIndex::new(request);
    let mut stops = Vec::new();
    let mut vehicles = Vec::with_capacity(solution.routes.len());

    for route in solution.routes {
        if route.vehicle.is_empty() {
            return Err(FailureCause::MissingField("routes.vehicle".to_string()));
        }

        let mut start_time = None;
        let mut end_time = None;
        let mut distance_meters = 0.0;
        let mut services_performed = 0u32;
        // Odometer and departure of the last service stop
        let mut previous: Option<(f64, Option<String>)> = None;

        for stop in route.stops {
            match stop.kind.as_str() {
                "start" => {
                    start_time = stop.eta;
                    continue;
                }
                "end" => {
                    end_time = stop.eta;
                    distance_meters = stop.odometer;
                    continue;
                }
                _ if !stop.is_service() => continue,
                _ => {}
            }

            let service_id = stop
                .services
                .first()
                .cloned()
                .unwrap_or_else(|| stop.location.clone());
            let service = index.resolve(&service_id)?;

            let (distance_from_previous, travel_secs_from_previous) = match &previous {
                Some((odometer, departure)) => (
                    stop.odometer - odometer,
                    match (departure.as_deref(), stop.eta.as_deref()) {
                        (Some(from), Some(to)) => seconds_between(from, to),
                        _ => 0,
                    },
                ),
                None => (0.0, 0),
            };

            let on_site = stop
                .duration
                .unwrap_or_else(|| u64::from(service.duration_secs));
            let dwell = add_secs(stop.wait, on_site, "stops.wait")?;
            let departure_time = stop.eta.as_deref().map(|eta| offset_timestamp(eta, dwell));

            previous = Some((stop.odometer, departure_time.clone()));
            services_performed += 1;

            stops.push(OptimizedStop {
                vehicle_id: route.vehicle.clone(),
                service_id,
                location: service.location,
                arrival_time: stop.eta,
                departure_time,
                wait_secs: stop.wait,
                distance_from_previous,
                travel_secs_from_previous,
            });
        }

        let duration_secs = match (start_time.as_deref(), end_time.as_deref()) {
            (Some(start), Some(end)) => seconds_between(start, end),
            _ => 0,
        };

        vehicles.push(RouteMetrics {
            vehicle_id: route.vehicle,
            distance_meters,
            duration_secs,
            services_performed,
            start_time,
            end_time,
        });
    }

    Ok(FleetResponse {
        distance_meters: vehicles.iter().map(|v| v.distance_meters).sum(),
        duration_secs: total_duration_secs(&vehicles)?,
        stops,
        vehicles,
        provider: provider.to_string(),
    })
}
