//! Rate and acceleration limited low-pass.
//!
//! Each frame the low-pass step toward the target is expressed as a
//! velocity, then bounded:
//!
//! ```text
//! alpha = dt / (tc + dt)                      (1 when tc <= 0)
//! v     = alpha × (target − y) / dt
//! v     = clamp(v, ±max_rate)
//! v     = min(|v|, v_brake(|target − y|))     (accel limit only)
//! v     = clamp(v, v_prev ± max_accel·dt)     (accel limit only)
//! y    += v × dt
//! ```
//!
//! `v_brake(e) = a·dt·(√(¼ + 2e/(a·dt²)) − ½)` is the highest speed from which
//! the axis can still stop within distance `e` decelerating by `a·dt` per
//! frame, so a constant target is approached without overshoot.

/// What bounded the output of one smoothing step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothBound {
    pub rate: bool,
    pub accel: bool,
}

/// Low-pass coefficient. `1.0` when `tc <= 0.0` (low-pass disabled).
#[inline]
pub fn lowpass_alpha(tc: f64, dt: f64) -> f64 {
    if tc <= 0.0 { 1.0 } else { dt / (tc + dt) }
}

/// Internal state of one smoothed axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothState {
    /// Previous output.
    position: f64,
    /// Previous output velocity [unit/s].
    velocity: f64,
}

impl SmoothState {
    /// State at rest at `position`.
    #[inline]
    pub fn at(position: f64) -> Self {
        Self {
            position,
            velocity: 0.0,
        }
    }

    /// Re-seed at `position`, at rest.
    #[inline]
    pub fn reset(&mut self, position: f64) {
        *self = Self::at(position);
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

/// Highest speed from which the axis stops within `distance`.
#[inline]
fn braking_speed(distance: f64, accel: f64, dt: f64) -> f64 {
    let step = accel * dt;
    step * ((0.25 + 2.0 * distance / (step * dt)).sqrt() - 0.5)
}

/// Apply one smoothing step toward `target`.
///
/// `max_rate` must be positive; `max_accel`, when given, must be positive.
#[inline]
pub fn smooth_apply(
    state: &mut SmoothState,
    target: f64,
    alpha: f64,
    max_rate: f64,
    max_accel: Option<f64>,
    dt: f64,
) -> (f64, SmoothBound) {
    let mut bound = SmoothBound::default();
    let error = target - state.position;

    let desired = alpha * error / dt;
    let mut velocity = desired.clamp(-max_rate, max_rate);
    bound.rate = velocity != desired;

    if let Some(accel) = max_accel {
        let brake = braking_speed(error.abs(), accel, dt);
        if velocity.abs() > brake {
            velocity = brake.copysign(velocity);
        }
        let max_change = accel * dt;
        let limited = velocity.clamp(state.velocity - max_change, state.velocity + max_change);
        bound.accel = limited != velocity;
        velocity = limited;
    }

    state.position += velocity * dt;
    state.velocity = velocity;
    (state.position, bound)
}
