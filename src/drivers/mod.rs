//! Actuator/input drivers, hardware initialisation, and the task watchdog.

pub mod button;
pub mod hw_init;
pub mod servo;
pub mod watchdog;
