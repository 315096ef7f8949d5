//! Simulation driver module.
//!
//! Software actuator rig for development and testing without hardware.

mod driver;
mod physics;

pub use driver::{DriverCommand, SimulationDriver};
pub use physics::ActuatorSimulator;

use stewart_common::hal::driver::ActuatorDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn ActuatorDriver> {
    Box::new(SimulationDriver::new())
}
