//! Gate servo driver.
//!
//! Positions a hobby servo by pulse width on a 50 Hz LEDC channel.  The
//! dispenser uses two positions (closed / open); this driver accepts any
//! angle in `0..=180` and clamps the rest.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  Re-entrancy (starting a second
//! dispense cycle while the gate is open) is prevented by the dispenser
//! state machine, not here.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

/// Full servo travel in degrees.
pub const MAX_ANGLE: u8 = 180;

/// LEDC duty for a given angle at 14-bit resolution / 50 Hz.
pub fn angle_to_duty(angle: u8) -> u32 {
    let angle = angle.min(MAX_ANGLE) as u32;
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    let pulse_us = pins::SERVO_MIN_PULSE_US + span * angle / MAX_ANGLE as u32;
    let period_us = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
    let full_scale = 1u32 << hw_init::SERVO_DUTY_BITS;
    pulse_us * full_scale / period_us
}

pub struct ServoDriver {
    angle: Option<u8>,
    hw_duty: u32,
    moves: u32,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            angle: None,
            hw_duty: 0,
            moves: 0,
        }
    }

    /// Command the servo to `angle` degrees.  Repeating the current angle
    /// does not rewrite the duty register.
    pub fn set_angle(&mut self, angle: u8) {
        let angle = angle.min(MAX_ANGLE);
        if self.angle == Some(angle) {
            return;
        }
        let duty = angle_to_duty(angle);
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, duty);
        self.hw_duty = duty;
        self.angle = Some(angle);
        self.moves = self.moves.wrapping_add(1);
    }

    /// Stop driving the signal line (servo goes limp).
    pub fn release(&mut self) {
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, 0);
        self.hw_duty = 0;
        self.angle = None;
    }

    /// Last commanded angle; `None` before the first move or after release.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }

    pub fn current_duty(&self) -> u32 {
        self.hw_duty
    }

    pub fn move_count(&self) -> u32 {
        self.moves
    }
}
