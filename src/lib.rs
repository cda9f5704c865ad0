//! Sample web service built around a structured request-logging core.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                   REQLOG                     │
//!                    │                                              │
//!   Client Request   │  ┌───────────┐   ┌─────────────┐            │
//!   ─────────────────┼─▶│   trace   │──▶│   logging   │──┐         │
//!                    │  │correlation│   │ request log │  │         │
//!                    │  └───────────┘   │ body capture│  ▼         │
//!                    │                  └─────────────┘ ┌────────┐ │
//!                    │                                  │ errors │ │
//!   Client Response  │  ┌─────────────────────────┐     │boundary│ │
//!   ◀────────────────┼──│  http handlers (samples)│◀────┴────────┘ │
//!                    │  └─────────────────────────┘                │
//!                    │                                              │
//!                    │  Cross-cutting: config, tracing subscriber   │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! Every inbound request is stamped with a correlation id and a W3C trace
//! context, optionally has its body captured, and produces exactly one
//! structured log record; unhandled errors produce exactly one structured
//! error record and one problem response.

// Core subsystems
pub mod config;
pub mod http;
pub mod samples;

// Cross-cutting concerns
pub mod errors;
pub mod logging;
pub mod trace;

pub use config::AppConfig;
pub use http::HttpServer;
