//! One structured log record per completed request.
//!
//! Snapshots request facts before the downstream stages run, then gathers
//! the registered diagnostic items once the response is ready and emits a
//! single event carrying the framework fields and the diagnostic bag.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use crate::config::schema::RequestLogLevel;
use crate::http::server::AppState;
use crate::trace::{CorrelationId, TraceContext};

use super::diagnostic::{CapturedBody, DiagnosticContext};

/// Emits at the configured level; `tracing` needs the level at the callsite.
macro_rules! request_event {
    ($level:expr, $($fields:tt)*) => {
        match $level {
            RequestLogLevel::Error => tracing::error!($($fields)*),
            RequestLogLevel::Warn => tracing::warn!($($fields)*),
            RequestLogLevel::Info => tracing::info!($($fields)*),
            RequestLogLevel::Debug => tracing::debug!($($fields)*),
            RequestLogLevel::Trace => tracing::trace!($($fields)*),
        }
    };
}

pub async fn log_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.logging.http_request_logging {
        return next.run(request).await;
    }

    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let headers = request.headers().clone();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let correlation_id = request
        .extensions()
        .get::<CorrelationId>()
        .map(|id| id.as_str().to_owned())
        .unwrap_or_default();
    let trace_id = request
        .extensions()
        .get::<TraceContext>()
        .map(|ctx| ctx.correlation_id().to_owned())
        .unwrap_or_default();

    // The cell is filled by the body-capture stage; the cloned extension
    // set shares it, so the fill is visible here after completion.
    request.extensions_mut().insert(CapturedBody::default());
    let extensions = request.extensions().clone();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    let ctx = DiagnosticContext {
        headers: &headers,
        remote_addr,
        extensions: &extensions,
    };
    let properties = Value::Object(state.diagnostics.collect(&ctx));

    request_event!(
        state.config.logging.request_log_level,
        method = %method,
        path = %path,
        status,
        latency_ms,
        correlation_id = %correlation_id,
        trace_id = %trace_id,
        properties = %properties,
        "request handled"
    );

    response
}
