//! Shared utilities for integration tests.

use axum::Router;

use reqlog::config::{AppConfig, Environment};
use reqlog::http::server::{api_router, with_middleware, AppState};

/// Config with request logging switched on.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.logging.http_request_logging = true;
    config
}

/// Same, in development mode (verbose error payloads).
#[allow(dead_code)]
pub fn dev_config() -> AppConfig {
    let mut config = test_config();
    config.environment = Environment::Development;
    config
}

/// The full application with the complete middleware stack.
#[allow(dead_code)]
pub fn test_app(config: AppConfig) -> Router {
    with_middleware(api_router(), AppState::new(config))
}

/// The full application plus extra routes, all behind the same stack.
#[allow(dead_code)]
pub fn test_app_with(extra: Router<AppState>, config: AppConfig) -> Router {
    with_middleware(api_router().merge(extra), AppState::new(config))
}
