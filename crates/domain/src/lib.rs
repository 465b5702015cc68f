//! Domain layer for the signage geofence backend.
//!
//! This crate contains:
//! - Domain models (zones, rules, events, devices)
//! - The geofence targeting engine's pure services: geometry evaluation,
//!   rule resolution and membership diffing

pub mod models;
pub mod services;
