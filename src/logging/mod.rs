//! Request-logging subsystem.
//!
//! # Data Flow
//! ```text
//! request_log.rs (outer middleware)
//!     creates the CapturedBody cell, snapshots pre-request facts
//!     → body_capture.rs (inner middleware) fills the cell
//!     → handler runs
//!     ← request_log.rs invokes the DiagnosticRegistry and emits
//!       one structured record per request
//!
//! enrich.rs builds ad-hoc property bags for one-off records
//! (error boundary, fatal startup path).
//! ```

pub mod body_capture;
pub mod diagnostic;
pub mod enrich;
pub mod request_log;

pub use diagnostic::{CapturedBody, DiagnosticContext, DiagnosticItem, DiagnosticRegistry};
pub use enrich::LogEnricher;
