//! Correlation and trace-context propagation middleware.
//!
//! Ensures every request carries an `x-correlation-id` and a `traceparent`
//! header. Ids are generated only when absent; a caller-supplied value is
//! never overwritten. Generated values are echoed on the response so the
//! caller learns the identity its request was logged under.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::response::Response;
use tower::{Layer, Service};
use uuid::Uuid;

use super::context::TraceContext;
use super::{CORRELATION_ID_HEADER, TRACE_CONTEXT_HEADER};

/// Correlation id assigned to or carried by the current request.
///
/// Stored in request extensions by [`CorrelationLayer`].
#[derive(Debug, Clone)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Layer applying [`CorrelationService`] to the inner stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationLayer;

impl CorrelationLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService { inner }
    }
}

/// The propagator itself. Stateless; the next stage is invoked exactly once
/// per call and never captured across requests.
#[derive(Debug, Clone)]
pub struct CorrelationService<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let generated_id = ensure_correlation_id(&mut req);
        let generated_parent = ensure_trace_context(&mut req);

        let future = self.inner.call(req);

        Box::pin(async move {
            let mut response = future.await?;

            if let Some(value) = generated_id.and_then(|id| HeaderValue::from_str(&id).ok()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }

            if let Some(value) = generated_parent.and_then(|v| HeaderValue::from_str(&v).ok()) {
                response.headers_mut().insert(TRACE_CONTEXT_HEADER, value);
            }

            Ok(response)
        })
    }
}

/// Returns the generated id, or `None` when the caller supplied one.
fn ensure_correlation_id(req: &mut Request) -> Option<String> {
    if let Some(existing) = req.headers().get(CORRELATION_ID_HEADER) {
        let id = String::from_utf8_lossy(existing.as_bytes()).into_owned();
        req.extensions_mut().insert(CorrelationId(id));
        return None;
    }

    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        req.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    req.extensions_mut().insert(CorrelationId(id.clone()));

    Some(id)
}

/// Returns the generated header value, or `None` when one was present.
fn ensure_trace_context(req: &mut Request) -> Option<String> {
    if let Some(existing) = req.headers().get(TRACE_CONTEXT_HEADER) {
        // Pass through unchanged; a parseable value is kept for logging.
        if let Some(ctx) = existing
            .to_str()
            .ok()
            .and_then(|value| TraceContext::from_header(value).ok())
        {
            req.extensions_mut().insert(ctx);
        }
        return None;
    }

    let ctx = TraceContext::new();
    let rendered = ctx.render().to_owned();
    if let Ok(value) = HeaderValue::from_str(&rendered) {
        req.headers_mut().insert(TRACE_CONTEXT_HEADER, value);
    }
    req.extensions_mut().insert(ctx);

    Some(rendered)
}
