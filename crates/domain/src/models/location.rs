//! Location update DTOs.

use serde::{Deserialize, Serialize};

use super::geofence_event::GeofenceEventResponse;
use super::rule::TargetingDecision;

/// Request payload for a device location update.
/// POST /api/v1/devices/:device_id/location
#[derive(Debug, Clone, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateRequest {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    /// Milliseconds since epoch; defaults to server time when absent.
    #[validate(custom(function = "shared::validation::validate_timestamp"))]
    pub timestamp: Option<i64>,
}

/// Response for a processed location update: the events emitted by this fix
/// and the targeting decisions for the zones now occupied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateResponse {
    pub events: Vec<GeofenceEventResponse>,
    pub decisions: Vec<TargetingDecision>,
}
