//! Per-frame shaping diagnostic flags.

use bitflags::bitflags;

use super::pose::Axis;

bitflags! {
    /// Axes whose shaped output was bounded during the last frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AxisMask: u8 {
        const SURGE = 0x01;
        const SWAY  = 0x02;
        const HEAVE = 0x04;
        const ROLL  = 0x08;
        const PITCH = 0x10;
        const YAW   = 0x20;
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::empty()
    }
}

impl AxisMask {
    /// Mask bit for a single axis.
    #[inline]
    pub const fn of(axis: Axis) -> Self {
        Self::from_bits_truncate(1 << axis as u8)
    }
}

/// What bounded the shaped output during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeFlags {
    /// Normalized input or washout output clipped to `[-1, 1]`.
    pub saturated: AxisMask,
    /// Frame-to-frame change clipped to `max_rate · dt`.
    pub rate_limited: AxisMask,
    /// Velocity change clipped to `max_accel · dt`.
    pub accel_limited: AxisMask,
}

impl ShapeFlags {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.saturated.is_empty() && self.rate_limited.is_empty() && self.accel_limited.is_empty()
    }
}
