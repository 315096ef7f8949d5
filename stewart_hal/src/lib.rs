//! # Stewart HAL Library
//!
//! Collaborator implementations behind the traits defined in
//! `stewart_common::hal`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Actuator driver implementations
//! - [`telemetry`] - Telemetry client implementations
//! - [`sensors`] - Temperature sources for the health status
//! - [`recorder`] - Shared event logs for diagnostics and tests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    stewart_hal (single crate)                │
//! │  ┌─────────────────┐  ┌──────────────────┐  ┌─────────────┐  │
//! │  │ DriverRegistry  │  │ ScriptedTelemetry│  │ Temperature │  │
//! │  │  "simulation" ──┼─►│  (command/pose   │  │ sources     │  │
//! │  └────────┬────────┘  │   script)        │  └─────────────┘  │
//! │           ▼           └──────────────────┘                   │
//! │  ┌─────────────────┐                                         │
//! │  │ ActuatorDriver  │ (trait object)                          │
//! │  └─────────────────┘                                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod driver_registry;
pub mod drivers;
pub mod recorder;
pub mod sensors;
pub mod telemetry;

pub use crate::driver_registry::DriverRegistry;
pub use crate::recorder::Recorder;
