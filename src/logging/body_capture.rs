//! Opportunistic request-body capture for diagnostics.
//!
//! Buffers the body of mutating requests so it can be logged with the
//! per-request record, then rebuilds the request from the buffered bytes so
//! downstream consumers read the original payload. hyper bodies are
//! single-pass, so full buffering is the forced-seekable mode here. Failure
//! to capture never fails the request.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;

use crate::http::server::AppState;

use super::diagnostic::CapturedBody;

pub async fn capture_request_body(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let options = &state.config.logging;
    if !options.http_request_logging || !carries_body(request.method()) {
        return next.run(request).await;
    }

    let (request, body) = read_request_data(request, options.max_body_bytes).await;

    if let Some(body) = body.filter(|body| !body.is_empty()) {
        if let Some(cell) = request.extensions().get::<CapturedBody>() {
            cell.set(body);
        }
    }

    next.run(request).await
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Buffers the body to text, handing back a request whose body yields the
/// original bytes. Requests that should not or cannot be captured pass
/// through untouched.
async fn read_request_data(request: Request, max_bytes: usize) -> (Request, Option<String>) {
    let content_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    if content_length == Some(0) {
        return (request, None);
    }

    // A declared length over the cap is never buffered.
    if content_length.is_some_and(|length| length > max_bytes as u64) {
        return (request, None);
    }

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_owned();

    // Uploaded file parts are deliberately not captured.
    if content_type.starts_with("multipart/form-data") {
        return (request, None);
    }

    let (parts, body) = request.into_parts();
    match axum::body::to_bytes(body, max_bytes).await {
        Ok(bytes) => {
            let text = if content_type.starts_with("application/x-www-form-urlencoded") {
                render_form_data(&bytes)
            } else {
                String::from_utf8_lossy(&bytes).into_owned()
            };
            (Request::from_parts(parts, Body::from(bytes)), Some(text))
        }
        Err(error) => {
            tracing::debug!(error = %error, "failed to buffer request body for logging");
            (Request::from_parts(parts, Body::empty()), None)
        }
    }
}

/// Renders form fields as `key=value` lines in payload order.
fn render_form_data(bytes: &[u8]) -> String {
    url::form_urlencoded::parse(bytes)
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
