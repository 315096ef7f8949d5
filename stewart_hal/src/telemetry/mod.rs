//! Telemetry client implementations.
//!
//! - [`scripted`] - Replays a configured frame script

pub mod scripted;

pub use scripted::ScriptedTelemetry;

use stewart_common::hal::driver::HalError;
use stewart_common::hal::telemetry::TelemetryClient;
use stewart_common::platform::config::TelemetryConfig;

/// Create the telemetry client selected by `config.kind`.
///
/// # Errors
/// Returns `HalError::DriverNotFound` for an unknown kind.
pub fn create_client(config: &TelemetryConfig) -> Result<Box<dyn TelemetryClient>, HalError> {
    match config.kind.as_str() {
        "scripted" => Ok(Box::new(ScriptedTelemetry::new(config))),
        other => Err(HalError::DriverNotFound(format!("telemetry client '{other}'"))),
    }
}
