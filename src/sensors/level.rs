//! Bowl level adapter.
//!
//! Converts a raw ultrasonic round-trip time into a fullness percentage.
//! The sensor sits above the bowl looking down, so a short distance means
//! a full bowl:
//!
//! ```text
//!   distance ≤ full_cm            → 100 %
//!   full_cm < distance < empty_cm → linear
//!   empty_cm ≤ distance ≤ 2·empty → 0 %
//!   distance > 2·empty_cm         → Fault(OutOfRange)
//!   negative sample               → Fault(NoEcho)
//! ```
//!
//! No filtering beyond range validation is applied.

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// Speed of sound at room temperature, centimetres per microsecond.
const SOUND_CM_PER_US: f32 = 0.0343;

/// Bowl fullness for one tick, or the reason it is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BowlReading {
    Level(u8),
    Fault(SensorError),
}

impl BowlReading {
    pub fn percent(self) -> Option<u8> {
        match self {
            Self::Level(p) => Some(p),
            Self::Fault(_) => None,
        }
    }

    pub fn is_fault(self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// Reference distances measured at install time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelCalibration {
    /// Sensor-to-food distance with a full bowl (cm).
    pub full_distance_cm: f32,
    /// Sensor-to-bottom distance with an empty bowl (cm).
    pub empty_distance_cm: f32,
}

impl Default for LevelCalibration {
    fn default() -> Self {
        Self {
            full_distance_cm: 3.0,
            empty_distance_cm: 15.0,
        }
    }
}

pub struct LevelAdapter {
    cal: LevelCalibration,
}

impl LevelAdapter {
    pub fn new(cal: LevelCalibration) -> Self {
        Self { cal }
    }

    /// Classify a raw echo round-trip time in microseconds.
    pub fn read_level(&self, round_trip_us: i64) -> BowlReading {
        if round_trip_us < 0 {
            return BowlReading::Fault(SensorError::NoEcho);
        }
        self.read_distance(Self::distance_cm(round_trip_us))
    }

    /// Classify an already-converted distance.
    pub fn read_distance(&self, distance_cm: f32) -> BowlReading {
        let LevelCalibration {
            full_distance_cm: full,
            empty_distance_cm: empty,
        } = self.cal;

        if distance_cm > 2.0 * empty {
            return BowlReading::Fault(SensorError::OutOfRange);
        }

        let span = empty - full;
        if span <= 0.0 {
            // Degenerate calibration: anything nearer than empty is full.
            return BowlReading::Level(if distance_cm < empty { 100 } else { 0 });
        }

        let pct = ((empty - distance_cm) / span * 100.0).round();
        BowlReading::Level(pct.clamp(0.0, 100.0) as u8)
    }

    /// One-way distance for a round-trip echo time.
    pub fn distance_cm(round_trip_us: i64) -> f32 {
        round_trip_us as f32 * SOUND_CM_PER_US / 2.0
    }

    pub fn calibration(&self) -> LevelCalibration {
        self.cal
    }
}
