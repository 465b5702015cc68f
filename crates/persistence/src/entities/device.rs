//! Device entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the devices table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub id: i64,
    pub device_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<DeviceEntity> for domain::models::Device {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            id: entity.id,
            device_id: entity.device_id,
            company_id: entity.company_id,
            name: entity.name,
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_seen_at: entity.last_seen_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_entity_to_domain() {
        let entity = DeviceEntity {
            id: 1,
            device_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Lobby Screen".to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_seen_at: None,
        };

        let device: domain::models::Device = entity.clone().into();
        assert_eq!(device.device_id, entity.device_id);
        assert_eq!(device.company_id, entity.company_id);
        assert_eq!(device.name, entity.name);
        assert!(device.active);
    }
}
