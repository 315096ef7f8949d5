//! Swell dwell timer, counted in frames.

/// Frames of dwell for `duration_s` at `frame_interval_s`, at least one.
pub fn dwell_frames(duration_s: f64, frame_interval_s: f64) -> u32 {
    let frames = (duration_s / frame_interval_s - 1e-9).ceil();
    if frames.is_finite() && frames >= 1.0 {
        frames.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Countdown for an active swell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwellTimer {
    frames: u32,
    remaining: u32,
}

impl SwellTimer {
    pub const fn new(frames: u32) -> Self {
        Self {
            frames,
            remaining: 0,
        }
    }

    /// (Re)start the full dwell.
    #[inline]
    pub fn start(&mut self) {
        self.remaining = self.frames;
    }

    #[inline]
    pub fn cancel(&mut self) {
        self.remaining = 0;
    }

    #[inline]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Count one frame. Returns true on the frame the dwell expires.
    #[inline]
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}
