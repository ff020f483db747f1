//! PetFeeder firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod autofeed;
pub mod config;
pub mod dispenser;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod scheduler;

// Hardware-facing modules; the real implementations are guarded by cfg
// attributes inside, with in-memory simulation on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
