//! Domain models and request/response DTOs.

pub mod device;
pub mod geofence_event;
pub mod location;
pub mod rule;
pub mod zone;

pub use device::Device;
pub use geofence_event::{GeofenceEvent, GeofenceEventType};
pub use rule::{Decision, GeofenceRule, RuleType, TargetingDecision};
pub use zone::{GeoPoint, GeofenceZone, ZoneGeometry};
