//! Unified error types for the PetFeeder firmware.
//!
//! A single `Error` enum that every subsystem can convert into. All
//! variants are `Copy` so they travel through the decision engine and the
//! event sink without allocation.
//!
//! None of these are fatal. Sensor faults degrade the auto-feed pass for
//! one tick, a busy actuator drops the redundant request, and a schedule
//! validation failure is rejected at the gateway while the previous
//! schedule stays in force.

use core::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The bowl level could not be determined this tick.
    Sensor(SensorError),
    /// The dispenser gate refused a request.
    Actuator(ActuatorError),
    /// A schedule replacement failed validation.
    Schedule(ScheduleError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Schedule(e) => write!(f, "schedule: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Reasons a raw distance sample is rejected as "unknown level".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorError {
    /// The echo never returned (negative round-trip sample).
    NoEcho,
    /// The computed distance is farther than twice the empty reference.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEcho => write!(f, "no echo"),
            Self::OutOfRange => write!(f, "distance out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// A dispense cycle is already in progress; the request was skipped.
    Busy,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "gate busy, request skipped"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Schedule validation
// ---------------------------------------------------------------------------

/// Which half of a slot time failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotField {
    Hour,
    Minute,
}

impl fmt::Display for SlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hour => write!(f, "hour"),
            Self::Minute => write!(f, "minute"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// A slot value is outside `-1..=23` (hour) or `0..=59` (minute).
    OutOfRange {
        slot: usize,
        field: SlotField,
        value: i32,
    },
    /// The request body could not be decoded.
    Malformed,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { slot, field, value } => {
                write!(f, "slot {} {} out of range ({})", slot + 1, field, value)
            }
            Self::Malformed => write!(f, "malformed schedule request"),
        }
    }
}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
