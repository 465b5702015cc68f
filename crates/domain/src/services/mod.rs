//! Pure domain services for the geofence targeting engine.

pub mod geometry;
pub mod membership;
pub mod rule_resolution;
