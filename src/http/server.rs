//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the sample API
//! - Wire up the request-logging middleware stack in pipeline order
//! - Bind the server to a listener and run with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::errors::boundary::{handle_errors, Problem};
use crate::errors::{AppError, ErrorBoundary};
use crate::http::handlers;
use crate::logging::body_capture::capture_request_body;
use crate::logging::request_log::log_request;
use crate::logging::DiagnosticRegistry;
use crate::samples::SampleStore;
use crate::trace::CorrelationLayer;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub samples: Arc<SampleStore>,
    pub diagnostics: Arc<DiagnosticRegistry>,
    pub error_boundary: Arc<ErrorBoundary>,
}

impl AppState {
    /// State with the built-in diagnostic items and error matchers.
    pub fn new(config: AppConfig) -> Self {
        let error_boundary = ErrorBoundary::new(config.environment.is_development())
            .with_matcher(|error| match error {
                AppError::SampleNotFound { .. } => {
                    Some(Problem::new(StatusCode::NOT_FOUND, "Sample was not found"))
                }
                _ => None,
            });

        Self {
            config: Arc::new(config),
            samples: Arc::new(SampleStore::with_seed_data()),
            diagnostics: Arc::new(DiagnosticRegistry::with_default_items()),
            error_boundary: Arc::new(error_boundary),
        }
    }
}

/// HTTP server for the sample service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::new(config);
        Self {
            router: build_router(state),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Routes for the sample API.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/samples",
            get(handlers::list_samples).post(handlers::create_sample),
        )
        .route("/api/samples/{id}", get(handlers::get_sample))
}

/// Applies the middleware stack to `routes` in pipeline order:
/// correlation → request log → body capture → error boundary → handler.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let config = state.config.clone();

    // Layers added later wrap the ones added earlier.
    routes
        .layer(middleware::from_fn_with_state(state.clone(), handle_errors))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            capture_request_body,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), log_request))
        .layer(CorrelationLayer::new())
        .layer(DefaultBodyLimit::max(config.listener.max_request_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.listener.request_timeout_secs,
        )))
        .with_state(state)
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    with_middleware(api_router(), state)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
