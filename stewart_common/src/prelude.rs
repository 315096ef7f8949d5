//! Prelude module for common re-exports.
//!
//! ```rust
//! use stewart_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::platform::config::{EnvelopePolicy, MovePolicy, PlatformConfig};

// ─── Platform Types ─────────────────────────────────────────────────
pub use crate::platform::geometry::{ActuatorLengths, Geometry, Limits};
pub use crate::platform::health::{HealthStatus, Severity, StatusColor};
pub use crate::platform::pose::{Axis, AxisArray, Pose, AXIS_COUNT};
pub use crate::platform::state::{PlatformCommand, PlatformMode};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::hal::driver::{ActuatorDriver, HalError, ParkPositions};
pub use crate::hal::sensor::TemperatureSource;
pub use crate::hal::telemetry::{EventQueue, TelemetryClient};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{FRAME_RATE_HZ, MAX_ACTUATORS};
