//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FeederService (domain)
//! ```
//!
//! Driven adapters (level sensor, gate servo, event sinks, clocks)
//! implement these traits.  The [`FeederService`](super::service::FeederService)
//! consumes them via generics, so the decision engine never touches
//! hardware directly.

use crate::scheduler::CivilTime;
use crate::sensors::level::BowlReading;

// ───────────────────────────────────────────────────────────────
// Level port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one fresh bowl reading per tick.
pub trait LevelPort {
    /// Sample the sensor and classify the result.  Never fails; an
    /// unusable sample is reported as [`BowlReading::Fault`].
    fn read_bowl(&mut self) -> BowlReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to position the gate.
pub trait ActuatorPort {
    /// Drive the dispenser gate servo to `angle` degrees.
    fn set_gate_angle(&mut self, angle: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: clocks → domain)
// ───────────────────────────────────────────────────────────────

pub trait TimePort {
    /// Milliseconds since boot.  Monotonic.
    fn uptime_ms(&self) -> u64;

    /// Local wall-clock time, or `None` while the clock is unsynced.
    fn civil_time(&self) -> Option<CivilTime>;
}
