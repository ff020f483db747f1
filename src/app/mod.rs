//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the feeding decision engine: schedule and
//! auto-feed reconciliation, the command mailbox, and the gateway
//! boundary.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod gateway;
pub mod ports;
pub mod service;
