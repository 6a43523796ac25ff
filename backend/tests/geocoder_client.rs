use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::{to_bytes, Body},
    extract::{Query, State},
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use optimizer_backend::{
    create_router,
    geocoder::{GeocodeError, GeocodeOutcome, Geocoder, GeocoderConfig, GoogleGeocoder},
    models::{Coordinate, OptimizeRouteResponse},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const API_KEY: &str = "test-key";

/// Minimal stand-in for the Google Geocoding API.
async fn provider(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);

    if params.get("key").map(String::as_str) != Some(API_KEY) {
        return Json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        }));
    }

    let location = match params.get("address").map(String::as_str) {
        Some("Tel Aviv") => json!({"lat": 32.08, "lng": 34.78}),
        Some("Haifa") => json!({"lat": 32.79, "lng": 34.99}),
        Some("Jerusalem") => json!({"lat": 31.78, "lng": 35.22}),
        Some("Over Quota") => {
            return Json(json!({"status": "OVER_QUERY_LIMIT", "results": []}));
        }
        _ => return Json(json!({"status": "ZERO_RESULTS", "results": []})),
    };

    Json(json!({
        "status": "OK",
        "results": [{"geometry": {"location": location}}]
    }))
}

async fn broken_provider() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn slow_provider() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"status": "ZERO_RESULTS", "results": []}))
}

struct StubProvider {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl StubProvider {
    async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/geocode/json", get(provider))
            .route("/broken/json", get(broken_provider))
            .route("/slow/json", get(slow_provider))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            hits,
        }
    }

    fn geocoder(&self, path: &str) -> GoogleGeocoder {
        let config = GeocoderConfig::default()
            .with_api_key(API_KEY)
            .with_base_url(format!("{}{path}", self.base));
        GoogleGeocoder::new(config).expect("client")
    }
}

#[tokio::test]
async fn resolves_first_result() {
    let stub = StubProvider::spawn().await;
    let geocoder = stub.geocoder("/geocode/json");

    assert_eq!(
        geocoder.geocode("Haifa").await,
        GeocodeOutcome::Resolved(Coordinate { lat: 32.79, lon: 34.99 })
    );
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_results_is_unresolved() {
    let stub = StubProvider::spawn().await;
    let geocoder = stub.geocoder("/geocode/json");

    assert!(matches!(
        geocoder.lookup("Atlantis").await,
        Err(GeocodeError::ZeroResults)
    ));
    assert_eq!(geocoder.geocode("Atlantis").await, GeocodeOutcome::Unresolved);
}

#[tokio::test]
async fn provider_error_status_is_unresolved() {
    let stub = StubProvider::spawn().await;
    let geocoder = stub.geocoder("/geocode/json");

    match geocoder.lookup("Over Quota").await {
        Err(GeocodeError::Provider { status, .. }) => assert_eq!(status, "OVER_QUERY_LIMIT"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(geocoder.geocode("Over Quota").await, GeocodeOutcome::Unresolved);
}

#[tokio::test]
async fn wrong_api_key_is_unresolved() {
    let stub = StubProvider::spawn().await;
    let config = GeocoderConfig::default()
        .with_api_key("stolen-key")
        .with_base_url(format!("{}/geocode/json", stub.base));
    let geocoder = GoogleGeocoder::new(config).unwrap();

    match geocoder.lookup("Haifa").await {
        Err(GeocodeError::Provider { status, message }) => {
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(message, "The provided API key is invalid.");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn http_failure_is_unresolved() {
    let stub = StubProvider::spawn().await;
    let geocoder = stub.geocoder("/broken/json");

    assert!(matches!(
        geocoder.lookup("Haifa").await,
        Err(GeocodeError::Http(_))
    ));
    assert_eq!(geocoder.geocode("Haifa").await, GeocodeOutcome::Unresolved);
}

#[tokio::test]
async fn http_error_does_not_leak_api_key() {
    let stub = StubProvider::spawn().await;
    let geocoder = stub.geocoder("/broken/json");

    let err = geocoder.lookup("Haifa").await.unwrap_err();
    assert!(!err.to_string().contains(API_KEY), "{err}");
}

#[tokio::test]
async fn missing_api_key_sends_no_request() {
    let stub = StubProvider::spawn().await;
    let config = GeocoderConfig::default().with_base_url(format!("{}/geocode/json", stub.base));
    let geocoder = GoogleGeocoder::new(config).unwrap();

    assert_eq!(geocoder.geocode("Haifa").await, GeocodeOutcome::Unresolved);
    assert_eq!(stub.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn slow_provider_times_out() {
    let stub = StubProvider::spawn().await;
    let config = GeocoderConfig::default()
        .with_api_key(API_KEY)
        .with_base_url(format!("{}/slow/json", stub.base))
        .with_timeout(Duration::from_millis(200));
    let geocoder = GoogleGeocoder::new(config).unwrap();

    match geocoder.lookup("Haifa").await {
        Err(GeocodeError::Http(err)) => assert!(err.is_timeout(), "{err}"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn endpoint_uses_http_geocoder() {
    let stub = StubProvider::spawn().await;
    let app = create_router(AppState::new(Arc::new(stub.geocoder("/geocode/json"))));

    let payload = json!({"start": "Tel Aviv", "addresses": ["Haifa", "Nowhere", "Jerusalem"]});
    let request = Request::builder()
        .method("POST")
        .uri("/api/route/optimize")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: OptimizeRouteResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.route, vec!["Tel Aviv", "Jerusalem", "Haifa"]);
    assert_eq!(body.unresolved, vec!["Nowhere"]);
    assert!(body.total_distance > 100_000.0);
    assert_eq!(stub.hits.load(Ordering::SeqCst), 4);
}
