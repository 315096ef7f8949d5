//! Actuator physics for the simulation driver.

mod actuator;

pub use actuator::ActuatorSimulator;
