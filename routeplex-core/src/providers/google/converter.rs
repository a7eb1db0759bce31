//! Conversion between the canonical model and Google's formats

use super::types::*;
use crate::polyline::{self, DEFAULT_PRECISION};
use crate::protocol::{
    Coordinate, FleetResponse, FleetRouteRequest, OptimizedStop, PathResponse, RouteMetrics,
    SimpleRouteRequest, TravelMode,
};
use crate::providers::adapter::{
    add_secs, offset_timestamp, parse_duration_secs, total_duration_secs, StopIndex,
};
use crate::providers::error::FailureCause;

fn lat_lng(coordinate: Coordinate) -> GoogleLatLng {
    GoogleLatLng {
        latitude: coordinate.lat,
        longitude: coordinate.lng,
    }
}

fn waypoint(coordinate: Coordinate) -> GoogleWaypoint {
    GoogleWaypoint {
        location: GoogleLocation {
            lat_lng: lat_lng(coordinate),
        },
    }
}

fn travel_mode(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Driving => "DRIVE",
        TravelMode::Walking => "WALK",
        TravelMode::Cycling => "BICYCLE",
    }
}

/// Convert a point-to-point request into a `computeRoutes` body.
///
/// Callers validate that at least two waypoints are present. Round trips
/// end back at the origin, so every later waypoint becomes an intermediate.
pub fn to_compute_routes_request(request: &SimpleRouteRequest) -> ComputeRoutesRequest {
    let waypoints = &request.waypoints;
    let (destination, intermediates) = match (waypoints.first(), waypoints.split_last()) {
        (Some(origin), _) if request.round_trip => (*origin, waypoints.get(1..).unwrap_or(&[])),
        (_, Some((last, rest))) => (*last, rest.get(1..).unwrap_or(&[])),
        _ => (Coordinate::new(0.0, 0.0), &[][..]),
    };
    let origin = waypoints.first().copied().unwrap_or(destination);

    ComputeRoutesRequest {
        origin: waypoint(origin),
        destination: waypoint(destination),
        intermediates: intermediates.iter().copied().map(waypoint).collect(),
        travel_mode: travel_mode(request.travel_mode),
        routing_preference: (request.travel_mode == TravelMode::Driving)
            .then_some("TRAFFIC_AWARE_OPTIMAL"),
        optimize_waypoint_order: request.optimize_order,
    }
}

/// Convert a `computeRoutes` response into a canonical path
pub fn from_compute_routes_response(
    response: ComputeRoutesResponse,
    provider: &str,
) -> Result<PathResponse, FailureCause> {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| FailureCause::MissingField("routes".to_string()))?;

    let encoded = route.polyline.and_then(|p| p.encoded_polyline);
    let path = polyline::decode(encoded.as_deref(), DEFAULT_PRECISION)?;

    Ok(PathResponse {
        distance_meters: route.distance_meters,
        duration_secs: parse_duration_secs(route.duration.as_deref()),
        path,
        optimized_order: route.optimized_intermediate_waypoint_index.unwrap_or_default(),
        provider: provider.to_string(),
    })
}

/// Convert a fleet request into an `optimizeTours` body
pub fn to_optimize_tours_request(request: &FleetRouteRequest) -> OptimizeToursRequest {
    let shipments = request
        .services
        .iter()
        .map(|service| Shipment {
            label: service.id.clone(),
            deliveries: vec![VisitRequest {
                arrival_location: lat_lng(service.location),
                duration: format!("{}s", service.duration_secs),
            }],
            load_demands: service.has_demand().then(|| LoadMap {
                weight: LoadAmount {
                    amount: service.demand.to_string(),
                },
            }),
        })
        .collect();

    let vehicles = request
        .vehicles
        .iter()
        .map(|vehicle| GoogleVehicle {
            label: vehicle.id.clone(),
            start_location: lat_lng(vehicle.start),
            end_location: lat_lng(vehicle.end),
            load_limits: Some(LoadMap {
                weight: LoadLimit {
                    max_load: vehicle.effective_capacity().to_string(),
                },
            }),
            start_time_windows: vehicle
                .start_time
                .iter()
                .map(|start| TimeWindow {
                    start_time: Some(start.clone()),
                    end_time: None,
                })
                .collect(),
            end_time_windows: vehicle
                .end_time
                .iter()
                .map(|end| TimeWindow {
                    start_time: None,
                    end_time: Some(end.clone()),
                })
                .collect(),
        })
        .collect();

    OptimizeToursRequest {
        model: ShipmentModel {
            shipments,
            vehicles,
            global_start_time: request.global_start_time.clone(),
            global_end_time: request.global_end_time.clone(),
        },
    }
}

/// Convert an `optimizeTours` response into a canonical fleet result
pub fn from_optimize_tours_response(
    response: OptimizeToursResponse,
    request: &FleetRouteRequest,
    provider: &str,
) -> Result<FleetResponse, FailureCause> {
    let index = StopIndex::new(request);
    let mut stops = Vec::new();
    let mut vehicles = Vec::with_capacity(response.routes.len());

    for route in response.routes {
        let vehicle_id = route
            .vehicle_label
            .clone()
            .or_else(|| {
                // vehicleIndex 0 is omitted on the wire
                request
                    .vehicles
                    .get(route.vehicle_index.unwrap_or(0))
                    .map(|v| v.id.clone())
            })
            .ok_or_else(|| FailureCause::MissingField("routes.vehicleLabel".to_string()))?;

        // Running totals at each visit, reset per vehicle
        let mut odometer = 0.0;
        let mut clock = 0;
        let mut previous: Option<(f64, u64)> = None;

        for (i, visit) in route.visits.iter().enumerate() {
            let service_id = visit
                .shipment_label
                .clone()
                .or_else(|| {
                    visit
                        .shipment_index
                        .and_then(|idx| request.services.get(idx))
                        .map(|s| s.id.clone())
                })
                .ok_or_else(|| FailureCause::MissingField("visits.shipmentLabel".to_string()))?;
            let service = index.resolve(&service_id)?;

            let transition = route.transitions.get(i);
            if let Some(transition) = transition {
                odometer += transition.travel_distance_meters;
                clock = add_secs(
                    clock,
                    parse_duration_secs(transition.travel_duration.as_deref()),
                    "transitions.travelDuration",
                )?;
            }

            let (distance_from_previous, travel_secs_from_previous) = match previous {
                Some((prev_odometer, prev_clock)) => (odometer - prev_odometer, clock - prev_clock),
                None => (0.0, 0),
            };
            previous = Some((odometer, clock));

            stops.push(OptimizedStop {
                vehicle_id: vehicle_id.clone(),
                service_id,
                location: service.location,
                arrival_time: visit.start_time.clone(),
                departure_time: visit
                    .start_time
                    .as_deref()
                    .map(|start| offset_timestamp(start, u64::from(service.duration_secs))),
                wait_secs: parse_duration_secs(transition.and_then(|t| t.wait_duration.as_deref())),
                distance_from_previous,
                travel_secs_from_previous,
            });
        }

        let metrics = route.metrics.unwrap_or_default();
        vehicles.push(RouteMetrics {
            vehicle_id,
            distance_meters: metrics.travel_distance_meters,
            duration_secs: parse_duration_secs(metrics.travel_duration.as_deref()),
            services_performed: metrics
                .performed_shipment_count
                .unwrap_or(u32::try_from(route.visits.len()).unwrap_or(u32::MAX)),
            start_time: route.vehicle_start_time,
            end_time: route.vehicle_end_time,
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
