//! Stewart Common Library
//!
//! Shared types, constants and configuration loading for the Stewart platform
//! controller workspace.
//!
//! # Module Structure
//!
//! - [`platform`] - Pose, geometry, limits, modes, commands, health, config
//! - [`hal`] - Actuator driver, telemetry client and sensor interfaces
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod hal;
pub mod platform;
pub mod prelude;
