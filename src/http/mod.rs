//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → trace::correlation (ensure request identity)
//!     → logging::request_log (snapshot, emit record on completion)
//!     → logging::body_capture (buffer mutating-request bodies)
//!     → errors::boundary (map unhandled errors to problem responses)
//!     → handlers.rs (sample API)
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
