//! Shared utilities and common types for the signage backend.
//!
//! This crate provides functionality used across all other crates:
//! - Coordinate and timestamp validation logic
//! - Cursor-based pagination helpers

pub mod pagination;
pub mod validation;
