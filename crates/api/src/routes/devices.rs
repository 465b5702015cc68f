//! Device directory endpoint handlers.
//!
//! Thin surface: the targeting engine only needs devices registered so a
//! location update can resolve to a company. Fleet management is out of
//! scope here.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use persistence::repositories::DeviceRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::device::{
    Device, DeviceResponse, ListDevicesQuery, ListDevicesResponse, RegisterDeviceRequest,
};

/// Register a new signage device.
///
/// POST /api/v1/devices
pub async fn register_device(
    State(state): State<AppState>,
    Json(request): Json<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceResponse>), ApiError> {
    request.validate()?;

    let device_repo = DeviceRepository::new(state.pool.clone());
    let entity = device_repo.create(request.company_id, &request.name).await?;

    let device: Device = entity.into();
    let response: DeviceResponse = device.into();

    info!(
        device_id = %response.device_id,
        company_id = %response.company_id,
        name = %response.name,
        "Device registered"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single device by ID.
///
/// GET /api/v1/devices/:device_id
pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<Uuid>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device_repo = DeviceRepository::new(state.pool.clone());
    let entity = device_repo
        .find_by_device_id(device_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    let device: Device = entity.into();
    Ok(Json(device.into()))
}

/// List devices for a company.
///
/// GET /api/v1/devices?companyId=<uuid>
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Json<ListDevicesResponse>, ApiError> {
    let device_repo = DeviceRepository::new(state.pool.clone());
    let entities = device_repo.find_by_company_id(query.company_id).await?;

    let devices: Vec<DeviceResponse> = entities
        .into_iter()
        .map(|e| {
            let d: Device = e.into();
            d.into()
        })
        .collect();

    let total = devices.len();
    Ok(Json(ListDevicesResponse { devices, total }))
}
