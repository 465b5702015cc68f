//! Geofence event log endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use persistence::repositories::{EventLogQuery, GeofenceEventRepository};

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::geofence_event::{
    EventCountsQuery, EventCountsResponse, EventPaginationInfo, GeofenceEvent,
    GeofenceEventResponse, ListGeofenceEventsQuery, ListGeofenceEventsResponse,
};
use shared::pagination::{decode_cursor, encode_cursor};

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, ApiError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| ApiError::Validation(format!("Timestamp out of range: {}", millis)))
}

/// Maps a stored event row to the domain event; an unrecognized event type
/// in the log is a data integrity fault, not presentable output.
fn event_from_entity(
    entity: persistence::entities::GeofenceEventWithName,
) -> Result<GeofenceEvent, ApiError> {
    entity
        .try_into()
        .map_err(|e: persistence::entities::UnknownEventType| ApiError::Internal(e.to_string()))
}

/// List geofence events, newest first, with cursor pagination.
///
/// GET /api/v1/geofence-events?companyId=&zoneId=&deviceId=&type=&from=&to=&cursor=&limit=
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListGeofenceEventsQuery>,
) -> Result<Json<ListGeofenceEventsResponse>, ApiError> {
    let cursor = query
        .cursor
        .as_deref()
        .map(decode_cursor)
        .transpose()
        .map_err(|e| ApiError::Validation(format!("Invalid cursor: {}", e)))?;

    let from = query.from.map(millis_to_datetime).transpose()?;
    let to = query.to.map(millis_to_datetime).transpose()?;

    let log_query = EventLogQuery {
        zone_id: query.zone_id,
        device_id: query.device_id,
        event_type: query.event_type.map(|t| t.as_str().to_string()),
        from,
        to,
        cursor,
    };

    let limit = query.effective_limit();
    let event_repo = GeofenceEventRepository::new(state.pool.clone());
    let mut entities = event_repo.list(query.company_id, &log_query, limit).await?;

    // The repository fetched limit+1 rows to detect a further page
    let has_more = entities.len() as i64 > limit;
    if has_more {
        entities.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        entities
            .last()
            .map(|e| encode_cursor(e.occurred_at, e.id))
    } else {
        None
    };

    let mut events: Vec<GeofenceEventResponse> = Vec::with_capacity(entities.len());
    for entity in entities {
        events.push(event_from_entity(entity)?.into());
    }

    Ok(Json(ListGeofenceEventsResponse {
        events,
        pagination: EventPaginationInfo {
            next_cursor,
            has_more,
        },
    }))
}

/// Per-type event counts for a company, optionally scoped to a zone.
///
/// GET /api/v1/geofence-events/counts?companyId=&zoneId=
pub async fn event_counts(
    State(state): State<AppState>,
    Query(query): Query<EventCountsQuery>,
) -> Result<Json<EventCountsResponse>, ApiError> {
    let event_repo = GeofenceEventRepository::new(state.pool.clone());
    let rows = event_repo
        .count_by_type(query.company_id, query.zone_id, None, None)
        .await?;

    let mut response = EventCountsResponse {
        enter: 0,
        exit: 0,
        dwell: 0,
        total: 0,
    };

    for row in rows {
        match row.event_type.as_str() {
            "enter" => response.enter = row.count,
            "exit" => response.exit = row.count,
            "dwell" => response.dwell = row.count,
            _ => {}
        }
        response.total += row.count;
    }

    Ok(Json(response))
}
