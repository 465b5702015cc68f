//! HTTP route handlers.

pub mod devices;
pub mod geofence_events;
pub mod health;
pub mod locations;
pub mod rules;
pub mod zones;
