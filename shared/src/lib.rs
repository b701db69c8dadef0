//! Shared types and models for the Tomato Ripeness Management Service
//!
//! This crate holds the pure domain logic (ripeness bucketing, percentage and
//! setpoint arithmetic, harvest estimation) shared between the backend and
//! its test suites. It stays free of I/O and database dependencies.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
