//! Request identity: correlation ids and W3C trace context.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → correlation.rs (ensure x-correlation-id / traceparent headers,
//!       store CorrelationId + TraceContext in request extensions)
//!     → downstream middleware and handlers read the extensions
//!     → response carries the generated headers back to the caller
//! ```

pub mod context;
pub mod correlation;

pub use context::{TraceContext, TraceContextError};
pub use correlation::{CorrelationId, CorrelationLayer, CorrelationService};

/// Header carrying the opaque per-request correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Header carrying the W3C trace context.
pub const TRACE_CONTEXT_HEADER: &str = "traceparent";
