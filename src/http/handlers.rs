//! Sample API handlers.
//!
//! A primitive CRUD surface whose purpose is to drive traffic through the
//! request-logging pipeline.

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::samples::{SampleData, SampleRequest};

use super::server::AppState;

/// Get all samples.
pub async fn list_samples(State(state): State<AppState>) -> Json<Vec<SampleData>> {
    Json(state.samples.all().await)
}

/// Get the requested sample.
pub async fn get_sample(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SampleData>, AppError> {
    state
        .samples
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::sample_not_found(id))
}

/// Create a new sample.
pub async fn create_sample(
    State(state): State<AppState>,
    Json(request): Json<SampleRequest>,
) -> Json<SampleData> {
    Json(state.samples.create(request.name).await)
}
