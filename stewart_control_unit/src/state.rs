//! Platform state machine module root.
//!
//! - [`machine`] - Mode transitions driven by discrete commands
//! - [`swell`] - Frame-counted swell dwell

pub mod machine;
pub mod swell;

pub use machine::{EntryAction, PlatformStateMachine, TransitionOutcome};
pub use swell::SwellTimer;
