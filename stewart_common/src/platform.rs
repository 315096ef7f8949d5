//! Platform domain types shared by the control unit and the collaborators.
//!
//! Organized by concern: pose, rig geometry and limits, mode/command enums,
//! health status, shaping flags and configuration structures.

pub mod config;
pub mod flags;
pub mod geometry;
pub mod health;
pub mod pose;
pub mod state;
