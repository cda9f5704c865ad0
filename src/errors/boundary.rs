//! HTTP error boundary: one error record, one error response.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::http::server::AppState;
use crate::logging::LogEnricher;
use crate::trace::CorrelationId;

use super::AppError;

/// RFC 7807 style problem payload.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    pub status: u16,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, kind: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            kind: kind.into(),
            title: None,
            detail: None,
            instance: None,
        }
    }
}

type Matcher = Box<dyn Fn(&AppError) -> Option<Problem> + Send + Sync>;

/// Maps unhandled errors onto problem responses.
///
/// Matchers are consulted in registration order and the first match wins;
/// the fixed internal-error problem covers everything else.
pub struct ErrorBoundary {
    matchers: Vec<Matcher>,
    development: bool,
}

impl ErrorBoundary {
    pub fn new(development: bool) -> Self {
        Self {
            matchers: Vec::new(),
            development,
        }
    }

    pub fn with_matcher(
        mut self,
        matcher: impl Fn(&AppError) -> Option<Problem> + Send + Sync + 'static,
    ) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    fn resolve(&self, error: &AppError) -> Problem {
        self.matchers
            .iter()
            .find_map(|matcher| matcher(error))
            .unwrap_or_else(|| {
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error has occurred",
                )
            })
    }

    /// The response payload for `error`; outside production the payload
    /// additionally carries the message, the unwound chain and the raising
    /// location.
    pub fn problem_for(&self, error: &AppError, chain_text: &str) -> Problem {
        let mut problem = self.resolve(error);
        if self.development {
            problem.title = Some(error.to_string());
            problem.detail = Some(chain_text.to_owned());
            problem.instance = Some(error.meta().location().to_string());
        }
        problem
    }
}

/// Carries the original error out of a handler response so the boundary can
/// log and map it.
#[derive(Clone)]
pub struct StashedError(pub Arc<AppError>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The boundary middleware rewrites this into a problem response; the
        // bare status only survives when no boundary is installed.
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(StashedError(Arc::new(self)));
        response
    }
}

pub async fn handle_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let correlation_id = request
        .extensions()
        .get::<CorrelationId>()
        .map(|id| id.as_str().to_owned())
        .unwrap_or_default();

    let response = next.run(request).await;

    let Some(StashedError(error)) = response.extensions().get::<StashedError>().cloned() else {
        return response;
    };

    let chain = error.to_chain();
    let unwound = chain.unwrap_full();

    let enrichment = LogEnricher::new()
        .with("CorrelationId", correlation_id)
        .with("Path", &path)
        .with("ExceptionDetail", unwound.as_str())
        .into_properties();
    tracing::error!(
        error = %error,
        properties = %Value::Object(enrichment),
        "request failed with an unhandled error"
    );

    let problem = state.error_boundary.problem_for(&error, &unwound);
    let status =
        StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(problem)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found_matcher(error: &AppError) -> Option<Problem> {
        match error {
            AppError::SampleNotFound { .. } => {
                Some(Problem::new(StatusCode::NOT_FOUND, "Sample was not found"))
            }
            _ => None,
        }
    }

    #[test]
    fn first_matching_handler_wins() {
        let boundary = ErrorBoundary::new(false)
            .with_matcher(not_found_matcher)
            .with_matcher(|_| Some(Problem::new(StatusCode::IM_A_TEAPOT, "catch-all")));

        let problem = boundary.resolve(&AppError::sample_not_found(3));
        assert_eq!(problem.status, 404);
        assert_eq!(problem.kind, "Sample was not found");

        let problem = boundary.resolve(&AppError::internal("boom"));
        assert_eq!(problem.status, 418);
    }

    #[test]
    fn unmatched_errors_get_the_fixed_default() {
        let boundary = ErrorBoundary::new(false).with_matcher(not_found_matcher);

        let problem = boundary.resolve(&AppError::internal("boom"));
        assert_eq!(problem.status, 500);
        assert_eq!(problem.kind, "Internal server error has occurred");
    }

    #[test]
    fn development_payload_carries_detail() {
        let boundary = ErrorBoundary::new(true);
        let error = AppError::internal("boom");
        let chain_text = error.to_chain().unwrap_full();

        let problem = boundary.problem_for(&error, &chain_text);
        assert_eq!(problem.title.as_deref(), Some("boom"));
        assert_eq!(problem.detail.as_deref(), Some(chain_text.as_str()));
        assert!(problem.instance.is_some());
    }

    #[test]
    fn production_payload_is_generic() {
        let boundary = ErrorBoundary::new(false);
        let error = AppError::internal("boom");
        let chain_text = error.to_chain().unwrap_full();

        let problem = boundary.problem_for(&error, &chain_text);
        assert!(problem.title.is_none());
        assert!(problem.detail.is_none());
        assert!(problem.instance.is_none());
    }
}
