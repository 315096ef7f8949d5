//! Actuator driver trait and error types.
//!
//! This module defines:
//! - `ActuatorDriver` trait - interface for pluggable actuator backends
//! - `HalError` enum - error type shared by all collaborators
//! - `DriverFactory` type alias - factory function type
//! - `ParkPositions` - fixed actuator states handed to the driver at startup

use std::time::Duration;

use thiserror::Error;

use crate::platform::config::DriverConfig;
use crate::platform::geometry::{ActuatorLengths, Geometry, Limits};

/// Error type for collaborator operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Initialization failed.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hardware or network communication error.
    #[error("Communication error: {0}")]
    CommunicationError(String),

    /// Driver or client not found in a registry.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Motion command while the actuators are not enabled.
    #[error("Actuators not enabled")]
    NotEnabled,

    /// Sensor could not be read.
    #[error("Sensor error: {0}")]
    SensorError(String),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn ActuatorDriver>;

/// Platform-defined fixed actuator states.
///
/// Computed once by the control unit from the configured idle, ready and
/// swell poses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParkPositions {
    pub idle: ActuatorLengths,
    pub ready: ActuatorLengths,
    pub swell: ActuatorLengths,
}

/// Interface to the actuator rig.
///
/// # Lifecycle
///
/// 1. `init()` - once, before the control loop starts
/// 2. `geometry()` / `limits()` - read once at startup
/// 3. `set_park_positions()` - once, after the control unit validated its poses
/// 4. state-entry commands and `drive()` - from the control loop thread
/// 5. `cycle()` - once per frame
/// 6. `shutdown()` - once, after the loop exits
pub trait ActuatorDriver: Send {
    /// Driver identifier (e.g. "simulation").
    fn name(&self) -> &'static str;

    /// Rig name for display.
    fn platform_name(&self) -> &str;

    /// Initialize from the driver configuration.
    ///
    /// # Errors
    /// `HalError::InitFailed` or `HalError::ConfigError` if the rig cannot be
    /// brought up.
    fn init(&mut self, config: &DriverConfig) -> Result<(), HalError>;

    /// Attachment point geometry.
    fn geometry(&self) -> Result<Geometry, HalError>;

    /// Mechanical limits.
    fn limits(&self) -> Result<Limits, HalError>;

    /// Receive the fixed park positions.
    ///
    /// Default implementation does nothing (for drivers that park on their own).
    fn set_park_positions(&mut self, _park: &ParkPositions) {}

    /// Power the actuators up or down, starting from `lengths`.
    fn set_enabled(&mut self, enabled: bool, lengths: &ActuatorLengths) -> Result<(), HalError>;

    /// Park at the idle position, starting from `lengths`.
    fn move_to_idle(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError>;

    /// Park at the ready position, starting from `lengths`.
    fn move_to_ready(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError>;

    /// Raise for passenger access and hold for `duration`, then return.
    fn swell(&mut self, duration: Duration) -> Result<(), HalError>;

    /// Per-frame actuator command while Enabled.
    fn drive(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError>;

    /// Advance internal state by one frame.
    ///
    /// Default: no-op (for drivers with their own timing).
    fn cycle(&mut self, _dt: Duration) {}

    /// Graceful shutdown.
    fn shutdown(&mut self) -> Result<(), HalError>;
}
