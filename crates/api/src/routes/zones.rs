//! Geofence zone endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use persistence::repositories::ZoneRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::zone::{
    CreateZoneRequest, GeofenceZone, ListZonesQuery, ListZonesResponse, SetZoneActiveRequest,
    UpdateZoneRequest, ZoneResponse,
};

/// Create a new zone.
///
/// POST /api/v1/geofence-zones
pub async fn create_zone(
    State(state): State<AppState>,
    Json(request): Json<CreateZoneRequest>,
) -> Result<(StatusCode, Json<ZoneResponse>), ApiError> {
    request.validate()?;

    let zone_repo = ZoneRepository::new(state.pool.clone());

    // Zone names are unique per company (case-sensitive)
    if zone_repo
        .exists_by_name(request.company_id, &request.name, None)
        .await?
    {
        return Err(ApiError::Conflict(format!(
            "Zone named '{}' already exists for this company",
            request.name
        )));
    }

    let geometry_json = serde_json::to_value(&request.geometry)?;
    let entity = zone_repo
        .create(
            request.company_id,
            &request.name,
            request.geometry.type_str(),
            geometry_json,
            request.active,
            request.color.as_deref(),
            request.metadata,
        )
        .await?;

    let zone: GeofenceZone = entity.try_into()?;
    let response: ZoneResponse = zone.into();

    info!(
        zone_id = %response.zone_id,
        company_id = %response.company_id,
        name = %response.name,
        zone_type = response.geometry.type_str(),
        "Zone created"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// List zones for a company.
///
/// GET /api/v1/geofence-zones?companyId=<uuid>&includeInactive=<bool>
pub async fn list_zones(
    State(state): State<AppState>,
    Query(query): Query<ListZonesQuery>,
) -> Result<Json<ListZonesResponse>, ApiError> {
    let zone_repo = ZoneRepository::new(state.pool.clone());
    let entities = zone_repo
        .find_by_company_id(query.company_id, query.include_inactive)
        .await?;

    let mut zones = Vec::with_capacity(entities.len());
    for entity in entities {
        let zone: GeofenceZone = entity.try_into()?;
        zones.push(zone.into());
    }

    let total = zones.len();
    Ok(Json(ListZonesResponse { zones, total }))
}

/// Get a single zone by ID.
///
/// GET /api/v1/geofence-zones/:zone_id
pub async fn get_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> Result<Json<ZoneResponse>, ApiError> {
    let zone_repo = ZoneRepository::new(state.pool.clone());
    let entity = zone_repo
        .find_by_zone_id(zone_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Zone not found".to_string()))?;

    let zone: GeofenceZone = entity.try_into()?;
    Ok(Json(zone.into()))
}

/// Update a zone (partial update).
///
/// PUT /api/v1/geofence-zones/:zone_id
pub async fn update_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
    Json(request): Json<UpdateZoneRequest>,
) -> Result<Json<ZoneResponse>, ApiError> {
    request.validate()?;

    let zone_repo = ZoneRepository::new(state.pool.clone());
    let existing = zone_repo
        .find_by_zone_id(zone_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Zone not found".to_string()))?;

    if let Some(ref name) = request.name {
        if zone_repo
            .exists_by_name(existing.company_id, name, Some(zone_id))
            .await?
        {
            return Err(ApiError::Conflict(format!(
                "Zone named '{}' already exists for this company",
                name
            )));
        }
    }

    // zone_type and geometry always travel together
    let zone_type = request.geometry.as_ref().map(|g| g.type_str());
    let geometry_json = request
        .geometry
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    let entity = zone_repo
        .update(
            zone_id,
            request.name.as_deref(),
            zone_type,
            geometry_json,
            request.active,
            request.color.as_deref(),
            request.metadata,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Zone not found".to_string()))?;

    let zone: GeofenceZone = entity.try_into()?;
    let response: ZoneResponse = zone.into();

    info!(zone_id = %response.zone_id, "Zone updated");

    Ok(Json(response))
}

/// Toggle a zone's active flag.
///
/// PATCH /api/v1/geofence-zones/:zone_id/active
pub async fn set_zone_active(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
    Json(request): Json<SetZoneActiveRequest>,
) -> Result<Json<ZoneResponse>, ApiError> {
    let zone_repo = ZoneRepository::new(state.pool.clone());
    let entity = zone_repo
        .set_active(zone_id, request.active)
        .await?
        .ok_or_else(|| ApiError::NotFound("Zone not found".to_string()))?;

    let zone: GeofenceZone = entity.try_into()?;
    let response: ZoneResponse = zone.into();

    info!(zone_id = %response.zone_id, active = response.active, "Zone active flag changed");

    Ok(Json(response))
}

/// Delete a zone. Rules attached to the zone are removed with it; recorded
/// events keep their zone id and devices inside the zone receive an
/// implicit EXIT on their next location update.
///
/// DELETE /api/v1/geofence-zones/:zone_id
pub async fn delete_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let zone_repo = ZoneRepository::new(state.pool.clone());
    let deleted = zone_repo.delete(zone_id).await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Zone not found".to_string()));
    }

    info!(zone_id = %zone_id, "Zone deleted");

    Ok(StatusCode::NO_CONTENT)
}
