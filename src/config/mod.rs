//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to the server and middleware
//! ```
//!
//! Config is immutable once loaded; all fields have defaults so the service
//! also runs without a config file.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, Environment, ListenerConfig, LogConfig, RequestLogLevel};
