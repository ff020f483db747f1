//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the ultrasonic sensor, the level calibration, and the gate servo,
//! exposing them through [`LevelPort`] and [`ActuatorPort`].  This is the
//! only module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{ActuatorPort, LevelPort};
use crate::drivers::servo::ServoDriver;
use crate::sensors::level::{BowlReading, LevelAdapter};
use crate::sensors::ultrasonic::UltrasonicSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D: DelayNs> {
    sonar: UltrasonicSensor,
    level: LevelAdapter,
    servo: ServoDriver,
    delay: D,
}

impl<D: DelayNs> HardwareAdapter<D> {
    pub fn new(sonar: UltrasonicSensor, level: LevelAdapter, servo: ServoDriver, delay: D) -> Self {
        Self {
            sonar,
            level,
            servo,
            delay,
        }
    }

    pub fn sonar(&self) -> &UltrasonicSensor {
        &self.sonar
    }

    pub fn servo(&self) -> &ServoDriver {
        &self.servo
    }
}

// ── LevelPort implementation ──────────────────────────────────

impl<D: DelayNs> LevelPort for HardwareAdapter<D> {
    fn read_bowl(&mut self) -> BowlReading {
        let round_trip_us = self.sonar.measure(&mut self.delay);
        self.level.read_level(round_trip_us)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D: DelayNs> ActuatorPort for HardwareAdapter<D> {
    fn set_gate_angle(&mut self, angle: u8) {
        self.servo.set_angle(angle);
    }
}
