//! # Stewart Control Unit Library
//!
//! Turns a stream of 6-DOF pose requests into bounded actuator commands for a
//! parallel (Stewart-type) motion platform at a fixed frame rate.
//!
//! ## Subsystems
//!
//! 1. **Kinematics**: pose → actuator lengths, with envelope check
//! 2. **Shaping**: gain, washout, low-pass and rate/accel limiting
//! 3. **State machine**: Disabled / Idle / Ready / Enabled / Swell
//! 4. **Control loop**: telemetry intake, shaping, dispatch, health
//!
//! ## Single Writer
//!
//! Shaping state and the platform mode are owned by [`context::PlatformContext`]
//! and mutated only from the loop thread. Collaborators report through
//! [`stewart_common::hal::telemetry::EventQueue`] and never touch either.

pub mod config;
pub mod context;
pub mod cycle;
pub mod health;
pub mod kinematics;
pub mod shaping;
pub mod state;
