//! Failure injection tests for the gateway, end to end over HTTP.

use reqwest::StatusCode;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use resource_gateway::http::ErrorBody;
use resource_gateway::RetryPolicy;

mod common;

#[tokio::test]
async fn test_retry_on_failure() {
    let upstream = MockServer::start().await;
    common::mock_flaky(
        &upstream,
        "GET",
        "/users",
        2,
        503,
        200,
        json!({ "data": [common::user_json("1", "John Doe", "john@example.com")] }),
    )
    .await;

    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .get(format!("http://{}/users", addr))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), StatusCode::OK, "Should eventually succeed after retries");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!([common::user_json("1", "John Doe", "john@example.com")]));
    assert_eq!(common::request_count(&upstream).await, 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_exhausted_retries_return_service_unavailable() {
    let upstream = MockServer::start().await;
    common::mock_status(&upstream, "GET", "/parcs/1", 500).await;

    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .get(format!("http://{}/parcs/1", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.status_code, 503);
    assert_eq!(body.attempts, Some(3));
    assert!(body.message.contains("API call failed after 3 retries"));
    assert_eq!(common::request_count(&upstream).await, 4);

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_not_found_passes_through() {
    let upstream = MockServer::start().await;
    common::mock_status(&upstream, "GET", "/users/non-existent-id-12345", 404).await;

    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .get(format!("http://{}/users/non-existent-id-12345", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.status_code, 404);
    assert!(body.original_error.is_some());
    assert_eq!(common::request_count(&upstream).await, 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_returns_service_unavailable() {
    let (addr, shutdown) =
        common::start_gateway(&common::refused_base_url(), RetryPolicy::new(1, 10)).await;

    let res = common::http_client()
        .get(format!("http://{}/bookings", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_booking_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .post(format!("http://{}/bookings", addr))
        .json(&json!({
            "user": "user1",
            "parc": "parc1",
            "bookingdate": "10/01/2026",
            "comments": "Special request"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = res.json().await.unwrap();
    assert!(body.errors.iter().any(|e| e.starts_with("bookingdate")));
    assert_eq!(common::request_count(&upstream).await, 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_fields_are_rejected() {
    let upstream = MockServer::start().await;
    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .post(format!("http://{}/users", addr))
        .json(&json!({ "name": "Test", "email": "test@test.com", "admin": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::request_count(&upstream).await, 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_create_and_delete_status_codes() {
    let upstream = MockServer::start().await;
    common::mock_flaky(
        &upstream,
        "POST",
        "/parcs",
        1,
        502,
        201,
        common::parc_json("9", "Sunny Beach Resort", "Beautiful beachfront resort"),
    )
    .await;
    common::mock_status(&upstream, "DELETE", "/parcs/9", 204).await;

    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;
    let client = common::http_client();

    let res = client
        .post(format!("http://{}/parcs", addr))
        .json(&json!({
            "name": "Sunny Beach Resort",
            "description": "Beautiful beachfront resort"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["id"], "9");

    let res = client
        .delete(format!("http://{}/parcs/9", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_and_health() {
    let upstream = MockServer::start().await;
    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .get(format!("http://{}/health", addr))
        .header("x-request-id", "test-request-1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("test-request-1")
    );
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let res = common::http_client()
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unusable_upstream_body_is_bad_gateway() {
    let upstream = MockServer::start().await;
    common::mock_text(&upstream, "GET", "/users/1", 200, "not json").await;

    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .get(format!("http://{}/users/1", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(common::request_count(&upstream).await, 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let upstream = MockServer::start().await;
    let (addr, shutdown) = common::start_gateway(&upstream.uri(), common::fast_policy()).await;

    let res = common::http_client()
        .request(reqwest::Method::OPTIONS, format!("http://{}/bookings", addr))
        .header("origin", "http://localhost:4200")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(res.headers().contains_key("access-control-allow-methods"));
    assert_eq!(common::request_count(&upstream).await, 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_cors_restricted_to_configured_origins() {
    let upstream = MockServer::start().await;
    common::mock_json(&upstream, "GET", "/parcs", 200, json!({ "data": [] })).await;

    let mut config = common::gateway_config(&upstream.uri(), common::fast_policy());
    config.listener.cors_allow_origins = vec!["https://app.example.com".to_string()];
    let (addr, shutdown) = common::start_gateway_with(config).await;
    let client = common::http_client();

    let allowed = client
        .get(format!("http://{}/parcs", addr))
        .header("origin", "https://app.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://app.example.com")
    );

    let denied = client
        .get(format!("http://{}/parcs", addr))
        .header("origin", "https://evil.example.com")
        .send()
        .await
        .unwrap();
    assert!(!denied.headers().contains_key("access-control-allow-origin"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_deadline_is_gateway_timeout() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&upstream)
        .await;

    let mut config = common::gateway_config(&upstream.uri(), common::fast_policy());
    config.upstream.timeout_ms = 10_000;
    config.listener.request_timeout_secs = 1;
    let (addr, shutdown) = common::start_gateway_with(config).await;

    let res = common::http_client()
        .get(format!("http://{}/users", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);

    shutdown.trigger();
}
