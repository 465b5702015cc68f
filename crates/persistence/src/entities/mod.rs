//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod device;
pub mod geofence_event;
pub mod rule;
pub mod zone;
pub mod zone_membership;

pub use device::DeviceEntity;
pub use geofence_event::{
    EventTypeCountRow, GeofenceEventEntity, GeofenceEventWithName, UnknownEventType,
};
pub use rule::RuleEntity;
pub use zone::ZoneEntity;
pub use zone_membership::ZoneMembershipEntity;
