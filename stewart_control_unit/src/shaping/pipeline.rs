//! Shaping pipeline: owns all per-axis filter memory.

use stewart_common::platform::config::ShapeConfig;
use stewart_common::platform::flags::{AxisMask, ShapeFlags};
use stewart_common::platform::geometry::Limits;
use stewart_common::platform::pose::{Axis, AxisArray, Pose, AXIS_COUNT};

use super::smoothing::{lowpass_alpha, smooth_apply, SmoothState};
use super::washout::{washout_apply, washout_coefficient, WashoutState};
use super::ShapeError;

/// Stateful shaping of pose requests into bounded physical poses.
///
/// Created once at startup; `shape()` and `smooth()` are each called once per
/// frame. Filter memory is only cleared through [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct ShapingPipeline {
    /// Effective per-axis gain (axis gain × master gain).
    gain: AxisArray,
    travel: AxisArray,
    home: Pose,
    max_rate: AxisArray,
    max_accel: Option<AxisArray>,
    washout_coeff: [Option<f64>; AXIS_COUNT],
    alpha: AxisArray,
    dt: f64,

    washout: [WashoutState; AXIS_COUNT],
    smooth: [SmoothState; AXIS_COUNT],
    output: Pose,
    flags: ShapeFlags,
}

impl ShapingPipeline {
    /// Build from configuration, checked against the rig limits.
    ///
    /// The smoother starts at rest at `home`.
    ///
    /// # Errors
    /// `ShapeError::InvalidConfig` if a parameter is out of bounds or
    /// inconsistent with `limits`, or if `frame_interval` is not positive.
    pub fn new(
        config: &ShapeConfig,
        limits: &Limits,
        home: Pose,
        frame_interval: f64,
    ) -> Result<Self, ShapeError> {
        config.validate(limits).map_err(ShapeError::InvalidConfig)?;
        if !(frame_interval.is_finite() && frame_interval > 0.0) {
            return Err(ShapeError::InvalidConfig(format!(
                "frame interval {frame_interval} must be positive"
            )));
        }
        home.validate()
            .map_err(|e| ShapeError::InvalidConfig(format!("home pose: {e}")))?;

        let dt = frame_interval;
        let mut pipeline = Self {
            gain: config.gains.map(|g| g * config.master_gain),
            travel: limits.travel,
            home,
            max_rate: config.max_rate,
            // Shaping never accelerates harder than the rig allows.
            max_accel: config.max_accel.or(limits.max_accel),
            washout_coeff: config.washout_tc.map(|tc| washout_coefficient(tc, dt)),
            alpha: config.smoothing_tc.map(|tc| lowpass_alpha(tc, dt)),
            dt,
            washout: [WashoutState::default(); AXIS_COUNT],
            smooth: [SmoothState::default(); AXIS_COUNT],
            output: home,
            flags: ShapeFlags::default(),
        };
        pipeline.reset(&home);
        Ok(pipeline)
    }

    /// Gain/washout stage.
    ///
    /// Normalized requests are scaled, washed out and mapped onto the axis
    /// travel around the home pose. Physical requests pass unchanged.
    ///
    /// # Errors
    /// `ShapeError::NonFinite` for a NaN/infinite request; filter memory is
    /// left untouched.
    pub fn shape(&mut self, request: &Pose, normalized: bool) -> Result<Pose, ShapeError> {
        request.validate()?;
        self.flags = ShapeFlags::default();
        if !normalized {
            return Ok(*request);
        }

        let mut out = self.home;
        for axis in Axis::ALL {
            let i = axis.index();
            let scaled = request.get(axis) * self.gain[i];
            let x = scaled.clamp(-1.0, 1.0);
            let washed = washout_apply(&mut self.washout[i], self.washout_coeff[i], x);
            let y = washed.clamp(-1.0, 1.0);
            if x != scaled || y != washed {
                self.flags.saturated |= AxisMask::of(axis);
            }
            out.0[i] += y * self.travel[i];
        }
        Ok(out)
    }

    /// Smoothing stage, applied to every request.
    ///
    /// Per axis, consecutive outputs differ by at most `max_rate · dt`.
    ///
    /// # Errors
    /// `ShapeError::NonFinite` for a NaN/infinite request.
    pub fn smooth(&mut self, request: &Pose) -> Result<Pose, ShapeError> {
        request.validate()?;
        for axis in Axis::ALL {
            let i = axis.index();
            let (y, bound) = smooth_apply(
                &mut self.smooth[i],
                request.get(axis),
                self.alpha[i],
                self.max_rate[i],
                self.max_accel.map(|a| a[i]),
                self.dt,
            );
            if bound.rate {
                self.flags.rate_limited |= AxisMask::of(axis);
            }
            if bound.accel {
                self.flags.accel_limited |= AxisMask::of(axis);
            }
            self.output.0[i] = y;
        }
        Ok(self.output)
    }

    /// `shape()` followed unconditionally by `smooth()`.
    pub fn process(&mut self, request: &Pose, normalized: bool) -> Result<Pose, ShapeError> {
        let shaped = self.shape(request, normalized)?;
        self.smooth(&shaped)
    }

    /// Stateless conversion of a request into physical units.
    ///
    /// Applies gain and travel scaling but neither washout nor smoothing.
    /// Used for state-entry commands.
    pub fn to_physical(&self, pose: &Pose, normalized: bool) -> Pose {
        if !normalized {
            return *pose;
        }
        let mut out = self.home;
        for i in 0..AXIS_COUNT {
            out.0[i] += (pose.0[i] * self.gain[i]).clamp(-1.0, 1.0) * self.travel[i];
        }
        out
    }

    /// Re-initialize all filter memory with the smoother at rest at `pose`.
    pub fn reset(&mut self, pose: &Pose) {
        for (state, &p) in self.smooth.iter_mut().zip(pose.0.iter()) {
            state.reset(p);
        }
        self.washout.iter_mut().for_each(WashoutState::reset);
        self.output = *pose;
        self.flags = ShapeFlags::default();
    }

    /// Last smoothed output.
    #[inline]
    pub fn output(&self) -> Pose {
        self.output
    }

    /// Bounds hit during the last frame.
    #[inline]
    pub fn flags(&self) -> ShapeFlags {
        self.flags
    }

    #[inline]
    pub fn home(&self) -> Pose {
        self.home
    }

    #[inline]
    pub fn frame_interval(&self) -> f64 {
        self.dt
    }
}
