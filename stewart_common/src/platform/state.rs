//! Platform mode and command enums.
//!
//! `PlatformMode` is the single authoritative mode value owned by the
//! platform state machine. `PlatformCommand` is the tagged form of the
//! discrete commands a telemetry client may issue.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlatformMode {
    /// Actuators not actively driven.
    #[default]
    Disabled = 0,
    /// Actuators parked at the rest pose.
    Idle = 1,
    /// Actuators parked at the ready pose, primed for motion.
    Ready = 2,
    /// Actuators track shaped pose requests every frame.
    Enabled = 3,
    /// Raised for passenger access; reverts after the dwell time.
    Swell = 4,
}

impl PlatformMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Idle),
            2 => Some(Self::Ready),
            3 => Some(Self::Enabled),
            4 => Some(Self::Swell),
            _ => None,
        }
    }

    /// Only `Enabled` forwards per-frame pose requests to the actuators.
    #[inline]
    pub const fn forwards_motion(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl std::fmt::Display for PlatformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disabled => "Disabled",
            Self::Idle => "Idle",
            Self::Ready => "Ready",
            Self::Enabled => "Enabled",
            Self::Swell => "Swell",
        };
        f.write_str(s)
    }
}

/// Discrete command issued by the telemetry client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformCommand {
    #[serde(rename = "enable")]
    Enable,
    #[serde(rename = "disable")]
    Disable,
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "swellForStairs")]
    SwellForStairs,
    /// Terminate after confirmation (when an interactive surface is present).
    #[serde(rename = "quit")]
    Quit,
    /// Terminate immediately.
    #[serde(rename = "exit")]
    Exit,
}

impl PlatformCommand {
    /// Wire name as sent by telemetry clients.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::SwellForStairs => "swellForStairs",
            Self::Quit => "quit",
            Self::Exit => "exit",
        }
    }

    /// True for `quit` and `exit`.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Quit | Self::Exit)
    }
}

impl std::fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown command name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for PlatformCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "idle" => Ok(Self::Idle),
            "ready" => Ok(Self::Ready),
            "swellForStairs" => Ok(Self::SwellForStairs),
            "quit" => Ok(Self::Quit),
            "exit" => Ok(Self::Exit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}
