//! Mapbox adapters against a mocked Optimization API

use routeplex_core::http::{HttpClient, HttpExecutor};
use routeplex_core::protocol::{
    Coordinate, FleetRouteRequest, RouteRequest, ServicePoint, SimpleRouteRequest, Vehicle,
};
use routeplex_core::providers::{
    FailureCause, MapboxFleetProvider, MapboxTripsProvider, ProviderKind, ProviderSettings,
    RouteProvider,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> Arc<dyn HttpExecutor> {
    Arc::new(HttpClient::new().unwrap())
}

fn trips_provider(server: &MockServer) -> MapboxTripsProvider {
    MapboxTripsProvider::new("pk.test-token", transport()).with_settings(
        ProviderSettings::for_kind(ProviderKind::MapboxTrips).with_base_url(server.uri()),
    )
}

fn fleet_provider(server: &MockServer) -> MapboxFleetProvider {
    MapboxFleetProvider::new("sk.fleet-token", transport()).with_settings(
        ProviderSettings::for_kind(ProviderKind::MapboxFleet).with_base_url(server.uri()),
    )
}

fn simple_request() -> RouteRequest {
    SimpleRouteRequest::new(vec![
        Coordinate::new(40.7128, -74.006),
        Coordinate::new(40.7306, -73.9352),
        Coordinate::new(40.6782, -73.9442),
    ])
    .into()
}

fn fleet_request() -> FleetRouteRequest {
    let depot = Coordinate::new(40.7128, -74.006);
    FleetRouteRequest::new(
        vec![
            Vehicle::new("truck-a", depot, depot),
            Vehicle::new("truck-b", depot, depot),
        ],
        vec![
            ServicePoint::new("stop-1", Coordinate::new(40.72, -74.0)),
            ServicePoint::new("stop-2", Coordinate::new(40.73, -73.99)),
            ServicePoint::new("stop-3", Coordinate::new(40.74, -73.98)).with_duration(60),
        ],
    )
}

#[tokio::test]
async fn test_optimized_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/optimized-trips/v1/mapbox/driving/-74\.006000,40\.712800;.+"))
        .and(query_param("access_token", "pk.test-token"))
        .and(query_param("geometries", "polyline"))
        .and(query_param("source", "first"))
        .and(query_param("destination", "last"))
        .and(query_param("roundtrip", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Ok",
            "trips": [{
                "distance": 12040.7,
                "duration": 1288.4,
                "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"
            }],
            "waypoints": [
                {"waypoint_index": 0, "trips_index": 0},
                {"waypoint_index": 2, "trips_index": 0},
                {"waypoint_index": 1, "trips_index": 0}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = trips_provider(&server)
        .optimize(&simple_request())
        .await
        .unwrap();
    let path = response.as_simple().unwrap();

    assert_eq!(path.provider, "Mapbox");
    assert_eq!(path.distance_meters, 12040.7);
    assert_eq!(path.duration_secs, 1288);
    assert_eq!(path.optimized_order, vec![0, 2, 1]);
    assert_eq!(path.path.len(), 3);
}

#[tokio::test]
async fn test_trip_vendor_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        })))
        .mount(&server)
        .await;

    let err = trips_provider(&server)
        .optimize(&simple_request())
        .await
        .unwrap_err();

    assert_eq!(err.provider, "Mapbox");
    assert!(matches!(err.cause, FailureCause::Vendor { ref code, .. } if code == "NoRoute"));
}

#[tokio::test]
async fn test_trip_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Not Authorized - Invalid Token"})))
        .mount(&server)
        .await;

    let err = trips_provider(&server)
        .optimize(&simple_request())
        .await
        .unwrap_err();

    match err.cause {
        FailureCause::Transport(transport) => assert_eq!(transport.status(), Some(401)),
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_trip_corrupt_geometry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Ok",
            "trips": [{"distance": 1.0, "duration": 1.0, "geometry": "_p~iF~ps|U_ulL"}]
        })))
        .mount(&server)
        .await;

    let err = trips_provider(&server)
        .optimize(&simple_request())
        .await
        .unwrap_err();
    assert!(matches!(err.cause, FailureCause::Decode(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_fleet_routing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimized-trips/v2"))
        .and(query_param("access_token", "sk.fleet-token"))
        .and(body_partial_json(json!({
            "version": 1,
            "vehicles": [
                {"name": "truck-a", "start_location": "start-truck-a", "end_location": "end-truck-a"},
                {"name": "truck-b"}
            ],
            "services": [{"name": "stop-1", "location": "stop-1", "duration": 300}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dropped": {"services": [], "shipments": []},
            "routes": [
                {
                    "vehicle": "truck-a",
                    "stops": [
                        {"type": "start", "location": "start-truck-a", "eta": "2024-05-01T09:00:00Z", "odometer": 0},
                        {"type": "service", "location": "stop-2", "eta": "2024-05-01T09:07:00Z",
                         "odometer": 2500, "wait": 0, "duration": 300, "services": ["stop-2"]},
                        {"type": "service", "location": "stop-3", "eta": "2024-05-01T09:15:00Z",
                         "odometer": 3700, "wait": 120, "services": ["stop-3"]},
                        {"type": "end", "location": "end-truck-a", "eta": "2024-05-01T09:40:00Z", "odometer": 7000}
                    ]
                },
                {
                    "vehicle": "truck-b",
                    "stops": [
                        {"type": "start", "location": "start-truck-b", "eta": "2024-05-01T09:00:00Z", "odometer": 0},
                        {"type": "service", "location": "stop-1", "eta": "2024-05-01T09:05:00Z",
                         "odometer": 1200, "services": ["stop-1"]},
                        {"type": "end", "location": "end-truck-b", "eta": "2024-05-01T09:20:00Z", "odometer": 2400}
                    ]
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = fleet_provider(&server)
        .optimize(&fleet_request().into())
        .await
        .unwrap();
    let fleet = response.as_fleet().unwrap();

    assert_eq!(fleet.provider, "MapboxFleet");
    assert_eq!(fleet.distance_meters, 9400.0);
    assert_eq!(fleet.duration_secs, 2400 + 1200);
    assert_eq!(fleet.stops.len(), 3);

    let truck_a: Vec<_> = fleet.itinerary("truck-a").collect();
    assert_eq!(truck_a[0].distance_from_previous, 0.0);
    assert_eq!(truck_a[0].departure_time.as_deref(), Some("2024-05-01T09:12:00Z"));
    assert_eq!(truck_a[1].distance_from_previous, 1200.0);
    assert_eq!(truck_a[1].travel_secs_from_previous, 180);
    assert_eq!(truck_a[1].wait_secs, 120);
    // eta + 120s wait + 60s service
    assert_eq!(truck_a[1].departure_time.as_deref(), Some("2024-05-01T09:18:00Z"));

    let truck_b: Vec<_> = fleet.itinerary("truck-b").collect();
    assert_eq!(truck_b.len(), 1);
    assert_eq!(truck_b[0].distance_from_previous, 0.0);
    assert_eq!(truck_b[0].location, Coordinate::new(40.72, -74.0));

    assert_eq!(fleet.vehicles[0].services_performed, 2);
    assert_eq!(fleet.vehicles[1].distance_meters, 2400.0);
}

#[tokio::test]
async fn test_fleet_rejects_invalid_request() {
    let server = MockServer::start().await;

    let depot = Coordinate::new(0.0, 0.0);
    let request = FleetRouteRequest::new(
        vec![Vehicle::new("v", depot, depot)],
        vec![
            ServicePoint::new("dup", depot),
            ServicePoint::new("dup", depot),
        ],
    );

    let err = fleet_provider(&server)
        .optimize(&request.into())
        .await
        .unwrap_err();
    assert!(matches!(err.cause, FailureCause::InvalidRequest(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_fleet_wait_overflow_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimized-trips/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{
                "vehicle": "truck-a",
                "stops": [
                    {"type": "service", "location": "stop-1", "eta": "2024-05-01T09:05:00Z",
                     "odometer": 1200, "wait": u64::MAX, "duration": 10, "services": ["stop-1"]}
                ]
            }]
        })))
        .mount(&server)
        .await;

    let err = fleet_provider(&server)
        .optimize(&fleet_request().into())
        .await
        .unwrap_err();
    assert_eq!(err.provider, "MapboxFleet");
    assert!(matches!(err.cause, FailureCause::Parse(_)));
}

#[tokio::test]
async fn test_fleet_wire_capacity_zero_is_unconstrained() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimized-trips/v2"))
        .and(body_partial_json(json!({
            "vehicles": [{"name": "van", "capacities": {"weight": 1000}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"routes": []})))
        .expect(1)
        .mount(&server)
        .await;

    let request: FleetRouteRequest = serde_json::from_value(json!({
        "vehicles": [{
            "id": "van",
            "start": {"lat": 40.7128, "lng": -74.006},
            "end": {"lat": 40.7128, "lng": -74.006},
            "capacity": 0
        }],
        "services": [{"id": "stop-1", "location": {"lat": 40.72, "lng": -74.0}}]
    }))
    .unwrap();

    let response = fleet_provider(&server)
        .optimize(&request.into())
        .await
        .unwrap();
    assert!(response.as_fleet().unwrap().stops.is_empty());
}
