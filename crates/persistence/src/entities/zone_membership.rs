//! Device zone membership entity (database row mapping).
//!
//! One row per (device, zone) the device currently occupies. Transient
//! tracker state: rebuildable from the most recent ENTER/EXIT events.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::services::membership::MembershipSnapshot;

/// Database row mapping for the device_zone_memberships table.
#[derive(Debug, Clone, FromRow)]
pub struct ZoneMembershipEntity {
    pub device_id: Uuid,
    pub zone_id: Uuid,
    pub entered_at: DateTime<Utc>,
    pub last_event_at: DateTime<Utc>,
}

impl From<ZoneMembershipEntity> for MembershipSnapshot {
    fn from(entity: ZoneMembershipEntity) -> Self {
        Self {
            zone_id: entity.zone_id,
            entered_at: entity.entered_at,
            last_event_at: entity.last_event_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_entity_to_snapshot() {
        let entity = ZoneMembershipEntity {
            device_id: Uuid::new_v4(),
            zone_id: Uuid::new_v4(),
            entered_at: Utc::now(),
            last_event_at: Utc::now(),
        };

        let snapshot: MembershipSnapshot = entity.clone().into();
        assert_eq!(snapshot.zone_id, entity.zone_id);
        assert_eq!(snapshot.entered_at, entity.entered_at);
    }
}
