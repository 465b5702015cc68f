//! Device domain model.
//!
//! The device directory is a thin collaborator of the targeting engine: the
//! engine only needs to resolve a device to its company and active flag.
//! Full device management lives elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Represents a signage device (screen) in the system.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub device_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Request payload for registering a device.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    pub company_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Response payload for device operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub device_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<Device> for DeviceResponse {
    fn from(d: Device) -> Self {
        Self {
            device_id: d.device_id,
            company_id: d.company_id,
            name: d.name,
            active: d.active,
            created_at: d.created_at,
            last_seen_at: d.last_seen_at,
        }
    }
}

/// Query parameters for listing devices.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDevicesQuery {
    pub company_id: Uuid,
}

/// Response for listing devices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDevicesResponse {
    pub devices: Vec<DeviceResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_device_request_deserialization() {
        let json = r#"{
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Lobby Screen 1"
        }"#;
        let request: RegisterDeviceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Lobby Screen 1");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_device_request_empty_name() {
        let request = RegisterDeviceRequest {
            company_id: Uuid::new_v4(),
            name: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_device_response_serialization() {
        let response = DeviceResponse {
            device_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Window Display".to_string(),
            active: true,
            created_at: Utc::now(),
            last_seen_at: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"name\":\"Window Display\""));
        assert!(!json.contains("\"lastSeenAt\""));
    }
}
