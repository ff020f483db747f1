//! Outbound application events.
//!
//! The [`FeederService`](super::service::FeederService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use core::fmt;

use serde::Serialize;

use crate::error::SensorError;
use crate::fsm::GateState;
use crate::scheduler::{CivilTime, SLOT_COUNT, SlotTime};
use crate::sensors::level::BowlReading;

/// What asked for a dispense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispenseTrigger {
    /// A schedule slot matched (zero-based index).
    Scheduled { slot: u8 },
    /// The bowl read at or below the threshold.
    AutoFeed { percent: u8 },
    /// Gateway request or button press.
    Manual,
}

impl fmt::Display for DispenseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled { slot } => write!(f, "schedule slot {}", slot + 1),
            Self::AutoFeed { percent } => write!(f, "auto-feed at {}%", percent),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Structured events emitted by the decision engine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The engine has started with its boot schedule.
    Started {
        slots: [SlotTime; SLOT_COUNT],
        threshold_percent: u8,
    },

    /// The gate began a cycle for this trigger.
    DispenseStarted(DispenseTrigger),

    /// The gate closed again.
    DispenseCompleted { cycles: u32 },

    /// The gate was busy; this request was dropped.
    DispenseSkipped(DispenseTrigger),

    /// Bowl is low but the auto-feed cooldown is still running.
    AutoFeedDeferred { percent: u8, remaining_ms: u64 },

    /// Level unknown this tick; auto-feed pass skipped.
    SensorFault(SensorError),

    /// A validated schedule replacement took effect.
    ScheduleApplied([SlotTime; SLOT_COUNT]),

    /// Periodic status report.
    Status(StatusSnapshot),
}

/// Read-only view of the engine for display.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Reading from the most recent tick; `None` before the first.
    pub bowl: Option<BowlReading>,
    /// `None` while the wall clock is unsynced.
    pub civil_time: Option<CivilTime>,
    pub threshold_percent: u8,
    pub slots: [SlotTime; SLOT_COUNT],
    pub gate: GateState,
    pub dispense_cycles: u32,
}
