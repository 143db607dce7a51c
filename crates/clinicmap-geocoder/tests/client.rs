//! Integration tests for `NominatimClient` using wiremock HTTP mocks.

use std::sync::Arc;

use clinicmap_core::Coordinates;
use clinicmap_geocoder::{GeocodeError, Geocoder, GeocoderSettings, NominatimClient, RateLimiter};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base_url: &str) -> GeocoderSettings {
    GeocoderSettings {
        base_url: base_url.to_string(),
        user_agent: "clinicmap-tests/1.0".to_string(),
        timeout_secs: 5,
        max_retries: 2,
        retry_backoff_base_ms: 0,
        ..GeocoderSettings::default()
    }
}

fn test_client(base_url: &str) -> NominatimClient {
    NominatimClient::new(&settings(base_url), Arc::new(RateLimiter::unlimited()))
        .expect("client construction should not fail")
}

#[tokio::test]
async fn forward_returns_first_match() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "lat": "25.7617",
            "lon": "-80.1918",
            "display_name": "100 Main St, Miami, Miami-Dade County, Florida, 33101, United States",
            "importance": 0.62
        },
        {
            "lat": "26.0000",
            "lon": "-80.0000",
            "display_name": "Somewhere else",
            "importance": 0.1
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("q", "100 Main St, Miami, FL, USA"))
        .and(query_param("limit", "1"))
        .and(query_param("countrycodes", "us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .try_forward("100 Main St", "Miami", "FL")
        .await
        .expect("request should succeed")
        .expect("provider returned a match");

    assert!((result.coordinates.latitude - 25.7617).abs() < 1e-9);
    assert!((result.coordinates.longitude + 80.1918).abs() < 1e-9);
    assert!(result.matched_address.starts_with("100 Main St, Miami"));
    assert!((result.provider_confidence - 62.0).abs() < 1e-9);
}

#[tokio::test]
async fn forward_empty_array_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .try_forward("1 Nowhere Rd", "Atlantis", "ZZ")
        .await
        .expect("empty array is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn forward_without_importance_uses_default_confidence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "30.2672", "lon": "-97.7431", "display_name": "Austin, Texas, United States" }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .forward_geocode("500 Congress Ave", "Austin", "TX")
        .await
        .expect("provider returned a match");
    assert!((result.provider_confidence - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn reverse_returns_display_name() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "lat": "47.6062",
        "lon": "-122.3321",
        "display_name": "Pike Street, Seattle, King County, Washington, 98101, United States",
        "importance": 0.4
    });

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "47.6062"))
        .and(query_param("lon", "-122.3321"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .reverse_geocode(Coordinates::new(47.6062, -122.3321))
        .await
        .expect("provider returned a place");

    assert!(result.matched_address.contains("Seattle"));
    assert!((result.provider_confidence - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn reverse_error_object_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Unable to geocode" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .try_reverse(Coordinates::new(30.0, -140.0))
        .await
        .expect("error object is not a transport failure");
    assert!(result.is_none());
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "39.7392", "lon": "-104.9903", "display_name": "Denver, Colorado" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .try_forward("1 Civic Center", "Denver", "CO")
        .await
        .expect("second attempt should succeed");
    assert!(result.is_some());
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .try_forward("1 Main St", "Boise", "ID")
        .await
        .expect_err("404 should surface as an error");
    assert!(
        matches!(err, GeocodeError::UnexpectedStatus { status: 404, .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn persistent_outage_collapses_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client
        .forward_geocode("1 Main St", "Boise", "ID")
        .await
        .is_none());
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .try_forward("1 Main St", "Reno", "NV")
        .await
        .expect_err("html body is not json");
    assert!(matches!(err, GeocodeError::Deserialize { .. }));
}

#[tokio::test]
async fn requests_carry_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "clinicmap-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.try_forward("1 Main St", "Reno", "NV").await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn rate_limited_response_honours_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lat": "41.8781", "lon": "-87.6298", "display_name": "Chicago, Illinois"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .try_reverse(Coordinates::new(41.8781, -87.6298))
        .await
        .expect("retry after 429 should succeed");
    assert!(result.is_some());
}

#[tokio::test]
async fn slow_provider_times_out_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let settings = GeocoderSettings {
        timeout_secs: 1,
        max_retries: 1,
        ..settings(&server.uri())
    };
    let client = NominatimClient::new(&settings, Arc::new(RateLimiter::unlimited()))
        .expect("client construction should not fail");

    let started = std::time::Instant::now();
    let reverse = client.reverse_geocode(Coordinates::new(25.7617, -80.1918)).await;
    let forward = client.forward_geocode("100 Main St", "Miami", "FL").await;

    assert!(reverse.is_none());
    assert!(forward.is_none());
    assert!(
        started.elapsed() < std::time::Duration::from_secs(9),
        "requests should be cut off by the client timeout"
    );
}
