//! Motion shaping pipeline.
//!
//! Per-axis processing order (per frame):
//!
//! ```text
//! normalized request ─► gain ─► clamp[-1,1] ─► washout ─► clamp[-1,1] ─► ×travel + home ─┐
//! physical request ──────────────────────────────────────────────────────────────────────┤
//!                                                                                        ▼
//!                                        low-pass ─► rate limit ─► accel limit ─► shaped pose
//! ```
//!
//! Zero time constants disable washout and low-pass on that axis.

pub mod pipeline;
pub mod smoothing;
pub mod washout;

pub use pipeline::ShapingPipeline;

use stewart_common::platform::pose::PoseError;

/// Shaping failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Configuration missing or inconsistent with the rig limits (startup).
    InvalidConfig(String),
    /// Request pose has a NaN or infinite component (per frame).
    NonFinite(PoseError),
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "shaping config: {msg}"),
            Self::NonFinite(e) => write!(f, "shaping input: {e}"),
        }
    }
}

impl std::error::Error for ShapeError {}

impl From<PoseError> for ShapeError {
    fn from(e: PoseError) -> Self {
        Self::NonFinite(e)
    }
}
