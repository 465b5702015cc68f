//! Geofence event domain model.
//!
//! Events are immutable facts recorded by the membership tracker: a device
//! crossed into, out of, or continued to occupy a zone at a point in time.
//! The engine only ever appends to this history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geofence event transition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceEventType {
    Enter,
    Exit,
    Dwell,
}

impl GeofenceEventType {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Dwell => "dwell",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enter" => Some(Self::Enter),
            "exit" => Some(Self::Exit),
            "dwell" => Some(Self::Dwell),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeofenceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model for a geofence event.
#[derive(Debug, Clone)]
pub struct GeofenceEvent {
    pub id: i64,
    pub event_id: Uuid,
    pub company_id: Uuid,
    pub device_id: Uuid,
    pub zone_id: Uuid,
    pub zone_name: Option<String>,
    pub event_type: GeofenceEventType,
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing geofence events.
/// GET /api/v1/geofence-events
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofenceEventsQuery {
    pub company_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub event_type: Option<GeofenceEventType>,
    /// Inclusive lower bound, milliseconds since epoch.
    pub from: Option<i64>,
    /// Inclusive upper bound, milliseconds since epoch.
    pub to: Option<i64>,
    pub cursor: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// Hard cap on the events page size.
pub const MAX_EVENTS_LIMIT: i64 = 200;

impl ListGeofenceEventsQuery {
    /// Limit clamped to the valid range.
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_EVENTS_LIMIT)
    }
}

/// Response for a single geofence event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEventResponse {
    pub event_id: Uuid,
    pub device_id: Uuid,
    pub zone_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    pub event_type: GeofenceEventType,
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeofenceEvent> for GeofenceEventResponse {
    fn from(event: GeofenceEvent) -> Self {
        Self {
            event_id: event.event_id,
            device_id: event.device_id,
            zone_id: event.zone_id,
            zone_name: event.zone_name,
            event_type: event.event_type,
            occurred_at: event.occurred_at,
            latitude: event.latitude,
            longitude: event.longitude,
        }
    }
}

/// Pagination info for event listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPaginationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Response for listing geofence events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofenceEventsResponse {
    pub events: Vec<GeofenceEventResponse>,
    pub pagination: EventPaginationInfo,
}

/// Query parameters for the count-by-type aggregate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCountsQuery {
    pub company_id: Uuid,
    pub zone_id: Option<Uuid>,
}

/// Per-type event counts for a company (optionally scoped to a zone).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCountsResponse {
    pub enter: i64,
    pub exit: i64,
    pub dwell: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_serialization() {
        assert_eq!(
            serde_json::to_string(&GeofenceEventType::Enter).unwrap(),
            "\"enter\""
        );
        assert_eq!(
            serde_json::to_string(&GeofenceEventType::Exit).unwrap(),
            "\"exit\""
        );
        assert_eq!(
            serde_json::to_string(&GeofenceEventType::Dwell).unwrap(),
            "\"dwell\""
        );
    }

    #[test]
    fn test_event_type_parse() {
        assert_eq!(GeofenceEventType::parse("enter"), Some(GeofenceEventType::Enter));
        assert_eq!(GeofenceEventType::parse("exit"), Some(GeofenceEventType::Exit));
        assert_eq!(GeofenceEventType::parse("dwell"), Some(GeofenceEventType::Dwell));
        assert_eq!(GeofenceEventType::parse("invalid"), None);
    }

    const COMPANY: &str = r#""companyId":"550e8400-e29b-41d4-a716-446655440000""#;

    #[test]
    fn test_list_query_defaults() {
        let query: ListGeofenceEventsQuery =
            serde_json::from_str(&format!("{{{}}}", COMPANY)).unwrap();
        assert_eq!(query.limit, 50);
        assert!(query.zone_id.is_none());
        assert!(query.device_id.is_none());
        assert!(query.event_type.is_none());
    }

    #[test]
    fn test_list_query_missing_company_rejected() {
        assert!(serde_json::from_str::<ListGeofenceEventsQuery>("{}").is_err());
    }

    #[test]
    fn test_list_query_type_alias() {
        let query: ListGeofenceEventsQuery =
            serde_json::from_str(&format!(r#"{{{},"type":"exit","limit":10}}"#, COMPANY)).unwrap();
        assert_eq!(query.event_type, Some(GeofenceEventType::Exit));
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn test_effective_limit_clamped() {
        let mut query: ListGeofenceEventsQuery =
            serde_json::from_str(&format!("{{{}}}", COMPANY)).unwrap();
        query.limit = 0;
        assert_eq!(query.effective_limit(), 1);
        query.limit = 10_000;
        assert_eq!(query.effective_limit(), MAX_EVENTS_LIMIT);
    }

    #[test]
    fn test_event_response_serialization() {
        let response = GeofenceEventResponse {
            event_id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            zone_id: Uuid::new_v4(),
            zone_name: Some("Lobby".to_string()),
            event_type: GeofenceEventType::Enter,
            occurred_at: Utc::now(),
            latitude: 40.7128,
            longitude: -74.0060,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"eventType\":\"enter\""));
        assert!(json.contains("\"zoneName\":\"Lobby\""));
    }
}
