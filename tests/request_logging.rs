//! Body capture behavior through the full middleware stack.

mod common;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, Method, Request as HttpRequest, StatusCode};
use axum::routing::any;
use axum::Router;
use tower::ServiceExt;

use reqlog::config::AppConfig;
use reqlog::http::server::AppState;
use reqlog::logging::CapturedBody;

/// Returns `{captured}|{downstream body}` so both sides of the capture
/// contract are observable in one response.
async fn capture_probe(request: Request) -> String {
    let captured = request
        .extensions()
        .get::<CapturedBody>()
        .and_then(|cell| cell.get().map(str::to_owned))
        .unwrap_or_default();
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap();
    format!("{captured}|{}", String::from_utf8_lossy(&bytes))
}

fn probe_app(config: AppConfig) -> Router {
    common::test_app_with(
        Router::<AppState>::new().route("/probe", any(capture_probe)),
        config,
    )
}

async fn send(app: Router, request: HttpRequest<Body>) -> String {
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn posted_body_is_captured_and_replayed_downstream() {
    let payload = r#"{"name":"sample"}"#;
    let request = HttpRequest::builder()
        .method(Method::POST)
        .uri("/probe")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len().to_string())
        .body(Body::from(payload))
        .unwrap();

    let body = send(probe_app(common::test_config()), request).await;
    assert_eq!(body, format!("{payload}|{payload}"));
}

#[tokio::test]
async fn zero_content_length_yields_no_body_diagnostic() {
    let request = HttpRequest::builder()
        .method(Method::POST)
        .uri("/probe")
        .header(header::CONTENT_LENGTH, "0")
        .body(Body::empty())
        .unwrap();

    let body = send(probe_app(common::test_config()), request).await;
    assert_eq!(body, "|");
}

#[tokio::test]
async fn form_fields_are_rendered_as_lines() {
    let payload = "a=1&b=2";
    let request = HttpRequest::builder()
        .method(Method::POST)
        .uri("/probe")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::CONTENT_LENGTH, payload.len().to_string())
        .body(Body::from(payload))
        .unwrap();

    let body = send(probe_app(common::test_config()), request).await;
    // captured as key=value lines, replayed unchanged
    assert_eq!(body, format!("a=1\nb=2|{payload}"));
}

#[tokio::test]
async fn non_mutating_methods_are_not_captured() {
    let request = HttpRequest::builder()
        .method(Method::GET)
        .uri("/probe")
        .body(Body::from("ignored payload"))
        .unwrap();

    let body = send(probe_app(common::test_config()), request).await;
    assert_eq!(body, "|ignored payload");
}

#[tokio::test]
async fn capture_is_inert_when_request_logging_is_off() {
    let payload = "not captured";
    let request = HttpRequest::builder()
        .method(Method::POST)
        .uri("/probe")
        .header(header::CONTENT_LENGTH, payload.len().to_string())
        .body(Body::from(payload))
        .unwrap();

    let body = send(probe_app(AppConfig::default()), request).await;
    assert_eq!(body, format!("|{payload}"));
}
