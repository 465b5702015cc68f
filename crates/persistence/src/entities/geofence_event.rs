//! Geofence event entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use domain::models::{GeofenceEvent, GeofenceEventType};

/// Database row mapping for the geofence_events table.
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceEventEntity {
    pub id: i64,
    pub event_id: Uuid,
    pub company_id: Uuid,
    pub device_id: Uuid,
    pub zone_id: Uuid,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Event row joined with the zone name (NULL if the zone was deleted).
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceEventWithName {
    pub id: i64,
    pub event_id: Uuid,
    pub company_id: Uuid,
    pub device_id: Uuid,
    pub zone_id: Uuid,
    pub zone_name: Option<String>,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Row shape for the count-by-type aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct EventTypeCountRow {
    pub event_type: String,
    pub count: i64,
}

/// A stored event type string no longer matches the closed enum.
///
/// Stored strings come from GeofenceEventType::as_str; an unknown value
/// means out-of-band writes to the append-only log.
#[derive(Debug, Error)]
#[error("Unknown event type in database: {0}")]
pub struct UnknownEventType(pub String);

impl TryFrom<GeofenceEventEntity> for GeofenceEvent {
    type Error = UnknownEventType;

    fn try_from(entity: GeofenceEventEntity) -> Result<Self, Self::Error> {
        let event_type = GeofenceEventType::parse(&entity.event_type)
            .ok_or_else(|| UnknownEventType(entity.event_type.clone()))?;
        Ok(Self {
            id: entity.id,
            event_id: entity.event_id,
            company_id: entity.company_id,
            device_id: entity.device_id,
            zone_id: entity.zone_id,
            zone_name: None,
            event_type,
            occurred_at: entity.occurred_at,
            latitude: entity.latitude,
            longitude: entity.longitude,
            created_at: entity.created_at,
        })
    }
}

impl TryFrom<GeofenceEventWithName> for GeofenceEvent {
    type Error = UnknownEventType;

    fn try_from(entity: GeofenceEventWithName) -> Result<Self, Self::Error> {
        let event_type = GeofenceEventType::parse(&entity.event_type)
            .ok_or_else(|| UnknownEventType(entity.event_type.clone()))?;
        Ok(Self {
            id: entity.id,
            event_id: entity.event_id,
            company_id: entity.company_id,
            device_id: entity.device_id,
            zone_id: entity.zone_id,
            zone_name: entity.zone_name,
            event_type,
            occurred_at: entity.occurred_at,
            latitude: entity.latitude,
            longitude: entity.longitude,
            created_at: entity.created_at,
        })
    }
}
