//! System configuration parameters
//!
//! All tunable parameters for the PetFeeder, compiled in.  There is no
//! persistence; boot refuses to start on a config that fails
//! [`FeederConfig::validate`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scheduler::{SLOT_COUNT, SlotTime};
use crate::sensors::level::LevelCalibration;

/// Breakfast and dinner; third slot off.
const DEFAULT_SCHEDULE: [SlotTime; SLOT_COUNT] =
    [SlotTime::at(8, 0), SlotTime::at(18, 0), SlotTime::DISABLED];

/// Core feeder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    // --- Timing ---
    /// Decision engine tick period (milliseconds)
    pub tick_interval_ms: u32,
    /// Gate FSM / button poll period (milliseconds)
    pub gate_poll_interval_ms: u32,
    /// Status report interval (seconds)
    pub status_interval_secs: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Auto-feed ---
    /// Bowl fill (0-100%) at or below which auto-feed fires
    pub auto_feed_threshold_percent: u8,
    /// Minimum spacing between auto-feed triggers (milliseconds)
    pub auto_feed_min_interval_ms: u64,

    // --- Gate ---
    /// How long the gate stays open per dispense (milliseconds)
    pub gate_hold_ms: u32,
    /// Servo angle with the gate shut (degrees)
    pub gate_closed_angle: u8,
    /// Servo angle with the gate open (degrees)
    pub gate_open_angle: u8,

    // --- Level sensor ---
    pub level_calibration: LevelCalibration,

    // --- Schedule ---
    /// Boot-time feeding slots; hour -1 disables a slot
    pub default_schedule: [SlotTime; SLOT_COUNT],
    /// Fixed offset from UTC applied to wall-clock time (seconds)
    pub utc_offset_secs: i32,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 1000,     // 1 Hz
            gate_poll_interval_ms: 50,  // 20 Hz
            status_interval_secs: 60,   // 1/min
            watchdog_timeout_ms: 10_000,

            // Auto-feed
            auto_feed_threshold_percent: 20,
            auto_feed_min_interval_ms: 3_600_000, // 1 h

            // Gate
            gate_hold_ms: 900, // closes before the next tick
            gate_closed_angle: 0,
            gate_open_angle: 90,

            // Level sensor
            level_calibration: LevelCalibration::default(),

            // Schedule
            default_schedule: DEFAULT_SCHEDULE,
            utc_offset_secs: 0,
        }
    }
}

impl FeederConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.auto_feed_threshold_percent > 100 {
            return Err(Error::Config("auto-feed threshold above 100%"));
        }
        if self.tick_interval_ms == 0 || self.gate_poll_interval_ms == 0 {
            return Err(Error::Config("zero loop period"));
        }
        if self.gate_poll_interval_ms > self.tick_interval_ms {
            return Err(Error::Config("gate poll slower than tick"));
        }
        if self.status_interval_secs == 0 {
            return Err(Error::Config("zero status interval"));
        }
        if self.gate_hold_ms == 0 {
            return Err(Error::Config("zero gate hold"));
        }
        if self.gate_hold_ms >= self.tick_interval_ms {
            return Err(Error::Config("gate hold must end before the next tick"));
        }
        if self.gate_open_angle > 180 || self.gate_closed_angle > 180 {
            return Err(Error::Config("servo angle above 180°"));
        }
        if self.gate_open_angle == self.gate_closed_angle {
            return Err(Error::Config("gate open and closed angles are equal"));
        }
        let cal = self.level_calibration;
        if !(cal.full_distance_cm > 0.0 && cal.full_distance_cm < cal.empty_distance_cm) {
            return Err(Error::Config("level calibration: full must be nearer than empty"));
        }
        if u64::from(self.watchdog_timeout_ms) <= u64::from(self.gate_poll_interval_ms) * 4 {
            return Err(Error::Config("watchdog timeout too short for loop period"));
        }
        Ok(())
    }
}
