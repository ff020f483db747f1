//! Level-triggered auto-feed policy.
//!
//! When the bowl reads at or below the threshold the engine may dispense,
//! but never twice within the minimum interval.  A sensor fault is
//! "unknown level": the pass is skipped and the cooldown is untouched.

use crate::sensors::level::BowlReading;

/// Result of one auto-feed evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFeedDecision {
    /// Bowl level unknown this tick; nothing changed.
    SensorFault,
    /// Bowl is above the threshold.
    Satisfied,
    /// Bowl is low but the cooldown is still running.
    Deferred { remaining_ms: u64 },
    /// Bowl is low and the cooldown has elapsed; the timestamp was updated.
    Fire,
}

/// Cooldown state owned by the decision engine.
#[derive(Debug, Clone)]
pub struct AutoFeedState {
    threshold_percent: u8,
    min_interval_ms: u64,
    /// Monotonic time of the last honoured auto-feed; `None` since boot.
    last_fired_ms: Option<u64>,
}

impl AutoFeedState {
    pub fn new(threshold_percent: u8, min_interval_ms: u64) -> Self {
        Self {
            threshold_percent: threshold_percent.min(100),
            min_interval_ms,
            last_fired_ms: None,
        }
    }

    /// Auto-feed pass for one tick.
    pub fn evaluate(&mut self, reading: BowlReading, now_ms: u64) -> AutoFeedDecision {
        let percent = match reading {
            BowlReading::Fault(_) => return AutoFeedDecision::SensorFault,
            BowlReading::Level(p) => p,
        };

        if percent > self.threshold_percent {
            return AutoFeedDecision::Satisfied;
        }

        if let Some(last) = self.last_fired_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.min_interval_ms {
                let remaining_ms = self.min_interval_ms - elapsed;
                return AutoFeedDecision::Deferred { remaining_ms };
            }
        }

        self.last_fired_ms = Some(now_ms);
        AutoFeedDecision::Fire
    }

    pub fn threshold_percent(&self) -> u8 {
        self.threshold_percent
    }

    pub fn last_fired_ms(&self) -> Option<u64> {
        self.last_fired_ms
    }

    /// Monotonic time before which no auto-feed is honoured.
    pub fn cooldown_until_ms(&self) -> Option<u64> {
        self.last_fired_ms
            .map(|t| t.saturating_add(self.min_interval_ms))
    }
}
