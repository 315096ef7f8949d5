//! Actuator driver implementations.
//!
//! - [`simulation`] - Software rig for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `ActuatorDriver` trait from `stewart_common::hal::driver`
//! 3. Register the factory in [`register_all`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);
}
