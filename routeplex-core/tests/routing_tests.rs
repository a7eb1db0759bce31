//! Composite router over real adapters and mocked vendors

use routeplex_core::config::from_yaml_str;
use routeplex_core::http::{HttpClient, HttpExecutor};
use routeplex_core::protocol::{
    Coordinate, FleetRouteRequest, RouteRequest, ServicePoint, SimpleRouteRequest,
};
use routeplex_core::providers::{CompositeRouter, FailureCause, RoutingError, SelectionMetric};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn simple_request() -> RouteRequest {
    SimpleRouteRequest::new(vec![
        Coordinate::new(-23.5505, -46.6333),
        Coordinate::new(-23.5614, -46.6559),
    ])
    .into()
}

async fn mount_google(server: &MockServer, distance: u64, duration: &str) {
    Mock::given(method("POST"))
        .and(path("/directions/v2:computeRoutes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{"distanceMeters": distance, "duration": duration}]
        })))
        .mount(server)
        .await;
}

async fn mount_mapbox(server: &MockServer, distance: f64, duration: f64) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/optimized-trips/v1/mapbox/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Ok",
            "trips": [{"distance": distance, "duration": duration}]
        })))
        .mount(server)
        .await;
}

fn router_yaml(google: &MockServer, mapbox: &MockServer, metric: &str) -> String {
    format!(
        r#"
version: "0.1"
providers:
  - type: google_routes
    api_key: google-key
    base_url: {google}
  - type: mapbox_trips
    api_key: pk.token
    base_url: {mapbox}
  - name: Backup
    type: google_routes
    api_key: google-key
    base_url: {mapbox}
    enabled: false
  - type: mapbox_fleet
    api_key: sk.token
    base_url: {mapbox}
selection:
  metric: {metric}
  max_concurrency: 2
"#,
        google = google.uri(),
        mapbox = mapbox.uri(),
    )
}

fn build(yaml: &str) -> CompositeRouter {
    let config = from_yaml_str(yaml).unwrap();
    let transport: Arc<dyn HttpExecutor> = Arc::new(HttpClient::new().unwrap());
    CompositeRouter::from_config_with_transport(&config, transport).unwrap()
}

#[tokio::test]
async fn test_from_config_registers_enabled_providers() {
    let google = MockServer::start().await;
    let mapbox = MockServer::start().await;
    let router = build(&router_yaml(&google, &mapbox, "duration"));

    assert_eq!(router.providers(), vec!["Google", "Mapbox", "MapboxFleet"]);
    assert_eq!(router.metric(), SelectionMetric::Duration);
}

#[tokio::test]
async fn test_select_best_by_configured_metric() {
    let google = MockServer::start().await;
    let mapbox = MockServer::start().await;
    mount_google(&google, 5000, "600s").await;
    mount_mapbox(&mapbox, 4200.0, 720.0).await;

    let by_duration = build(&router_yaml(&google, &mapbox, "duration"));
    let best = by_duration.select_best(&simple_request()).await.unwrap();
    assert_eq!(best.provider(), "Google");

    let by_distance = build(&router_yaml(&google, &mapbox, "distance"));
    let best = by_distance.select_best(&simple_request()).await.unwrap();
    assert_eq!(best.provider(), "Mapbox");

    let best = by_distance
        .select_best_with(&simple_request(), SelectionMetric::Duration)
        .await
        .unwrap();
    assert_eq!(best.provider(), "Google");
}

#[tokio::test]
async fn test_select_best_survives_one_vendor_down() {
    let google = MockServer::start().await;
    let mapbox = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&google)
        .await;
    mount_mapbox(&mapbox, 4200.0, 9999.0).await;

    let router = build(&router_yaml(&google, &mapbox, "duration"));
    let best = router.select_best(&simple_request()).await.unwrap();
    assert_eq!(best.provider(), "Mapbox");
}

#[tokio::test]
async fn test_no_routes_available_collects_failures() {
    let google = MockServer::start().await;
    let mapbox = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "NoTrips"})))
        .mount(&mapbox)
        .await;

    let router = build(&router_yaml(&google, &mapbox, "duration"));
    match router.select_best(&simple_request()).await {
        Err(RoutingError::NoRoutesAvailable { failures }) => {
            let names: Vec<_> = failures.iter().map(|f| f.provider.as_str()).collect();
            assert_eq!(names, vec!["Google", "Mapbox"]);
            assert!(matches!(failures[0].cause, FailureCause::Transport(_)));
            assert!(matches!(failures[1].cause, FailureCause::Vendor { .. }));
        }
        other => panic!("expected NoRoutesAvailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_select_named_is_case_insensitive() {
    let google = MockServer::start().await;
    let mapbox = MockServer::start().await;
    mount_google(&google, 5000, "600s").await;
    mount_mapbox(&mapbox, 4200.0, 720.0).await;

    let router = build(&router_yaml(&google, &mapbox, "duration"));

    let response = router.select_named("MAPBOX", &simple_request()).await.unwrap();
    assert_eq!(response.provider(), "Mapbox");

    // Disabled providers are never registered
    assert!(matches!(
        router.select_named("backup", &simple_request()).await,
        Err(RoutingError::ProviderNotFound { .. })
    ));

    // Shape mismatch propagates from the named provider
    match router.select_named("mapboxfleet", &simple_request()).await {
        Err(RoutingError::Provider(err)) => {
            assert!(matches!(err.cause, FailureCause::UnsupportedShape { .. }))
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_compare_all_drops_failures_in_order() {
    let google = MockServer::start().await;
    let mapbox = MockServer::start().await;
    let third = MockServer::start().await;
    mount_google(&google, 5000, "600s").await;
    mount_mapbox(&mapbox, 4200.0, 720.0).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "rate limited"})))
        .mount(&third)
        .await;

    let yaml = format!(
        r#"
version: "0.1"
providers:
  - type: google_routes
    api_key: google-key
    base_url: {}
  - name: Flaky
    type: google_routes
    api_key: google-key
    base_url: {}
  - type: mapbox_trips
    api_key: pk.token
    base_url: {}
"#,
        google.uri(),
        third.uri(),
        mapbox.uri()
    );
    let router = build(&yaml);

    let all = router.compare_all(&simple_request()).await;
    let names: Vec<_> = all.iter().map(|r| r.provider()).collect();
    assert_eq!(names, vec!["Google", "Mapbox"]);
}

#[tokio::test]
async fn test_fleet_request_only_reaches_fleet_providers() {
    let google = MockServer::start().await;
    let mapbox = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/optimized-trips/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{
                "vehicle": "vehicle-1",
                "stops": [
                    {"type": "start", "location": "start-vehicle-1", "eta": "2024-05-01T09:00:00Z", "odometer": 0},
                    {"type": "service", "location": "a", "eta": "2024-05-01T09:05:00Z", "odometer": 800, "services": ["a"]},
                    {"type": "end", "location": "end-vehicle-1", "eta": "2024-05-01T09:20:00Z", "odometer": 1600}
                ]
            }]
        })))
        .expect(1)
        .mount(&mapbox)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&google)
        .await;

    let router = build(&router_yaml(&google, &mapbox, "duration"));
    let request = FleetRouteRequest::single_vehicle(
        Coordinate::new(0.0, 0.0),
        vec![ServicePoint::new("a", Coordinate::new(0.01, 0.01))],
    );

    let best = router.select_best(&request.into()).await.unwrap();
    let fleet = best.as_fleet().unwrap();
    assert_eq!(fleet.provider, "MapboxFleet");
    assert_eq!(fleet.stops[0].distance_from_previous, 0.0);
    assert_eq!(fleet.duration_secs, 1200);
}
