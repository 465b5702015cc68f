//! Location ingestion endpoint handler.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::engine;
use domain::models::location::{LocationUpdateRequest, LocationUpdateResponse};

/// Process a device location update.
///
/// POST /api/v1/devices/:device_id/location
pub async fn update_location(
    State(state): State<AppState>,
    Path(device_id): Path<Uuid>,
    Json(request): Json<LocationUpdateRequest>,
) -> Result<Json<LocationUpdateResponse>, ApiError> {
    request.validate()?;

    let response = engine::process_location_update(&state, device_id, &request).await?;

    info!(
        device_id = %device_id,
        events = response.events.len(),
        decisions = response.decisions.len(),
        "Location update processed"
    );

    Ok(Json(response))
}
