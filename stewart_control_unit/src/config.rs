//! TOML configuration loader with validation.
//!
//! Loads `PlatformConfig` from a single `platform.toml`. Section checks run
//! at load time; the cross checks that need the rig (shaping bounds against
//! the limits, fixed poses against the actuator envelope) run once the
//! driver has reported its geometry and limits.

use std::path::Path;

use stewart_common::config::{ConfigError, ConfigLoader};
use stewart_common::platform::config::PlatformConfig;
use stewart_common::platform::geometry::{Geometry, Limits};
use stewart_common::platform::pose::{Pose, AXIS_COUNT};

use crate::kinematics::{inverse_kinematics, KinematicsError};

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum LoadError {
    /// File I/O error.
    IoError(String),
    /// TOML parse error.
    ParseError(String),
    /// Parameter validation error.
    ValidationError(String),
    /// Fixed pose outside the actuator envelope.
    PoseOutOfEnvelope {
        name: &'static str,
        source: KinematicsError,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "config I/O error: {e}"),
            Self::ParseError(e) => write!(f, "config parse error: {e}"),
            Self::ValidationError(e) => write!(f, "config validation: {e}"),
            Self::PoseOutOfEnvelope { name, source } => {
                write!(f, "config validation: poses.{name}: {source}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::FileNotFound(path) => Self::IoError(format!("file not found: {path}")),
            ConfigError::ParseError(msg) => Self::ParseError(msg),
            ConfigError::ValidationError(msg) => Self::ValidationError(msg),
        }
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the platform configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PlatformConfig, LoadError> {
    let config = PlatformConfig::load(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(toml: &str) -> Result<PlatformConfig, LoadError> {
    let config = PlatformConfig::parse(toml)?;
    validate_config(&config)?;
    Ok(config)
}

/// Section checks that need no rig information.
pub fn validate_config(config: &PlatformConfig) -> Result<(), LoadError> {
    config.shared.validate()?;
    config
        .control_loop
        .validate()
        .map_err(|e| LoadError::ValidationError(format!("loop: {e}")))?;
    config
        .poses
        .validate()
        .map_err(|e| LoadError::ValidationError(format!("poses: {e}")))?;
    config
        .health
        .validate()
        .map_err(|e| LoadError::ValidationError(format!("health: {e}")))?;
    if config.driver.name.is_empty() {
        return Err(LoadError::ValidationError(
            "driver.name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Cross checks against the rig reported by the driver.
///
/// - shaping parameters against the limits
/// - every fixed pose (home, idle, ready, swell) inside the envelope
pub fn validate_against_rig(
    config: &PlatformConfig,
    geometry: &Geometry,
    limits: &Limits,
) -> Result<(), LoadError> {
    if limits.actuator_count() != geometry.actuator_count() {
        return Err(LoadError::ValidationError(format!(
            "limits cover {} actuators, geometry has {}",
            limits.actuator_count(),
            geometry.actuator_count()
        )));
    }
    config
        .shape
        .validate(limits)
        .map_err(|e| LoadError::ValidationError(format!("shape: {e}")))?;

    for (name, pose) in config.poses.named() {
        inverse_kinematics(&pose, geometry, limits)
            .map_err(|source| LoadError::PoseOutOfEnvelope { name, source })?;
    }
    Ok(())
}

/// Number of travel-box corners (±travel on every axis around `home`) whose
/// actuator lengths leave the envelope.
///
/// Zero means full-scale normalized input can never produce an
/// out-of-envelope frame.
pub fn travel_corners_outside(home: &Pose, geometry: &Geometry, limits: &Limits) -> usize {
    (0u32..1 << AXIS_COUNT)
        .filter(|mask| {
            let mut pose = *home;
            for i in 0..AXIS_COUNT {
                let sign = if mask & (1 << i) != 0 { 1.0 } else { -1.0 };
                pose.0[i] += sign * limits.travel[i];
            }
            inverse_kinematics(&pose, geometry, limits).is_err()
        })
        .count()
}

// ─── Tests ──────────────────────────────────────────────────────────
