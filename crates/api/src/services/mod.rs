//! Application services.

pub mod engine;
