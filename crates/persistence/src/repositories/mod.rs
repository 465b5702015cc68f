//! Repository implementations for database operations.

pub mod device;
pub mod geofence_event;
pub mod rule;
pub mod zone;
pub mod zone_membership;

pub use device::DeviceRepository;
pub use geofence_event::{EventLogQuery, GeofenceEventRepository};
pub use rule::RuleRepository;
pub use zone::ZoneRepository;
pub use zone_membership::{NewEventInput, ZoneMembershipRepository};
