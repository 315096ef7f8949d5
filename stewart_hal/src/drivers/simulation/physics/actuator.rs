//! Single linear actuator model.
//!
//! Each actuator slews toward its target length at a fixed speed. Length is
//! always kept inside the actuator's mechanical bounds.

use tracing::trace;

/// Length tolerance [mm] for the settled check.
const SETTLE_WINDOW: f64 = 0.01;

/// Slew-rate limited actuator.
#[derive(Debug, Clone)]
pub struct ActuatorSimulator {
    index: usize,
    /// Current length [mm]
    length: f64,
    /// Commanded length [mm]
    target: f64,
    /// Slew speed [mm/s]
    speed: f64,
    min_length: f64,
    max_length: f64,
    moving: bool,
}

impl ActuatorSimulator {
    /// Actuator resting at `length`.
    pub fn new(index: usize, length: f64, speed: f64, min_length: f64, max_length: f64) -> Self {
        let length = length.clamp(min_length, max_length);
        Self {
            index,
            length,
            target: length,
            speed,
            min_length,
            max_length,
            moving: false,
        }
    }

    /// Set the commanded length, clamped into the mechanical bounds.
    pub fn set_target(&mut self, target: f64) {
        self.target = target.clamp(self.min_length, self.max_length);
    }

    /// Stop where the actuator currently is.
    pub fn hold(&mut self) {
        self.target = self.length;
    }

    /// Advance by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        let error = self.target - self.length;
        let max_step = self.speed * dt;
        let step = error.clamp(-max_step, max_step);
        self.length += step;
        self.moving = step.abs() > f64::EPSILON;

        trace!(
            "Actuator {}: len={:.3}, target={:.3}, err={:.3}",
            self.index, self.length, self.target, error
        );
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.target - self.length).abs() <= SETTLE_WINDOW
    }
}
