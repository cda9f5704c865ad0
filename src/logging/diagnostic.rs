//! Pluggable per-request diagnostic facts.
//!
//! Each item contributes one named field to the per-request log record. The
//! set of items is assembled once at startup and enumerated in registration
//! order for every completed request, so the record layout is deterministic.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::http::{Extensions, HeaderMap};
use serde_json::{json, Map, Value};

/// Log key for the captured request body.
pub const BODY_KEY: &str = "Body";

/// Log key for the request header list.
pub const HEADERS_KEY: &str = "Headers";

/// Log key for the resolved client address.
pub const CLIENT_IP_KEY: &str = "IP address";

/// Sentinel logged when no remote address is known for the connection.
pub const CLIENT_IP_NONE: &str = "none";

/// View of a completed request handed to diagnostic items.
pub struct DiagnosticContext<'a> {
    pub headers: &'a HeaderMap,
    pub remote_addr: Option<SocketAddr>,
    pub extensions: &'a Extensions,
}

/// A single per-request fact producer.
///
/// Registered once at configuration time and invoked once per completed
/// request. Returning `None` excludes the key from the record entirely.
pub trait DiagnosticItem: Send + Sync {
    fn key(&self) -> &'static str;

    fn value(&self, ctx: &DiagnosticContext<'_>) -> Option<Value>;
}

/// Statically-assembled item set.
#[derive(Default)]
pub struct DiagnosticRegistry {
    items: Vec<Arc<dyn DiagnosticItem>>,
}

impl DiagnosticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in items: headers, client IP, request body.
    pub fn with_default_items() -> Self {
        Self::new()
            .register(RequestHeadersItem)
            .register(ClientIpItem)
            .register(RequestBodyItem)
    }

    pub fn register(mut self, item: impl DiagnosticItem + 'static) -> Self {
        self.items.push(Arc::new(item));
        self
    }

    /// Gathers every item's value into one property bag, skipping absent
    /// results. Key order is registration order.
    pub fn collect(&self, ctx: &DiagnosticContext<'_>) -> Map<String, Value> {
        let mut properties = Map::new();
        for item in &self.items {
            if let Some(value) = item.value(ctx) {
                properties.insert(item.key().to_owned(), value);
            }
        }
        properties
    }
}

/// Request-scoped cell filled by the body-capture middleware and read back
/// when the request record is assembled. Cloning shares the cell.
#[derive(Debug, Clone, Default)]
pub struct CapturedBody(Arc<OnceLock<String>>);

impl CapturedBody {
    /// Stores the captured body text; later calls are ignored.
    pub fn set(&self, body: String) {
        let _ = self.0.set(body);
    }

    /// The captured text, if any non-empty payload was seen.
    pub fn get(&self) -> Option<&str> {
        self.0
            .get()
            .map(String::as_str)
            .filter(|body| !body.is_empty())
    }
}

/// Logs request headers as an ordered list of name/value pairs.
pub struct RequestHeadersItem;

impl DiagnosticItem for RequestHeadersItem {
    fn key(&self) -> &'static str {
        HEADERS_KEY
    }

    fn value(&self, ctx: &DiagnosticContext<'_>) -> Option<Value> {
        let headers: Vec<Value> = ctx
            .headers
            .iter()
            .map(|(name, value)| {
                json!({
                    "name": name.as_str(),
                    "value": String::from_utf8_lossy(value.as_bytes()),
                })
            })
            .collect();
        Some(Value::Array(headers))
    }
}

/// Logs the resolved remote address of the connection.
pub struct ClientIpItem;

impl DiagnosticItem for ClientIpItem {
    fn key(&self) -> &'static str {
        CLIENT_IP_KEY
    }

    fn value(&self, ctx: &DiagnosticContext<'_>) -> Option<Value> {
        let ip = ctx
            .remote_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| CLIENT_IP_NONE.to_owned());
        Some(Value::String(ip))
    }
}

/// Logs the request body captured by the body-capture middleware.
pub struct RequestBodyItem;

impl DiagnosticItem for RequestBodyItem {
    fn key(&self) -> &'static str {
        BODY_KEY
    }

    fn value(&self, ctx: &DiagnosticContext<'_>) -> Option<Value> {
        ctx.extensions
            .get::<CapturedBody>()
            .and_then(CapturedBody::get)
            .map(|body| Value::String(body.to_owned()))
    }
}
