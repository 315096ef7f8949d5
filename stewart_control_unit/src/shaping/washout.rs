//! First-order washout (high-pass) filter.
//!
//! ```text
//! a    = tc / (tc + dt)
//! y[n] = a × (y[n-1] + x[n] − x[n-1])
//! ```
//!
//! A step input passes at full height and decays toward zero with time
//! constant `tc`. For `|x| <= 1` the output stays within `[-1, 1]` up to one
//! step of overshoot on a sign reversal, which the pipeline clamps.

/// Washout coefficient. `None` when `tc <= 0.0` (disabled).
#[inline]
pub fn washout_coefficient(tc: f64, dt: f64) -> Option<f64> {
    if tc <= 0.0 || dt <= 0.0 {
        None
    } else {
        Some(tc / (tc + dt))
    }
}

/// Internal state of the washout filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct WashoutState {
    prev_input: f64,
    prev_output: f64,
}

impl WashoutState {
    /// Reset filter state to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Apply one sample. Returns `input` unchanged when `coeff` is `None`.
#[inline]
pub fn washout_apply(state: &mut WashoutState, coeff: Option<f64>, input: f64) -> f64 {
    let output = match coeff {
        Some(a) => a * (state.prev_output + input - state.prev_input),
        None => input,
    };
    state.prev_input = input;
    state.prev_output = output;
    output
}
