//! Collaborator interfaces.
//!
//! - [`driver`] - actuator driver trait and HAL error type
//! - [`telemetry`] - telemetry client trait and the event queue it feeds
//! - [`sensor`] - raw temperature source trait

pub mod driver;
pub mod sensor;
pub mod telemetry;
