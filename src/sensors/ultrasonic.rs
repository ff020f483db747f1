//! HC-SR04 ultrasonic distance sensor driver.
//!
//! A 10 µs pulse on TRIG starts a ping; ECHO goes high for the round-trip
//! flight time.  This driver only measures that time; turning it into a
//! bowl level is the [`LevelAdapter`](super::level::LevelAdapter)'s job.
//!
//! A missing echo (timeout) is reported as [`NO_ECHO`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs TRIG/ECHO via hw_init and times the pulse with
//! the high-resolution esp_timer.
//! On host/test: reads from a static `AtomicI64` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI64, Ordering};

use embedded_hal::delay::DelayNs;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Sample value returned when no echo arrives before the timeout.
pub const NO_ECHO: i64 = -1;

/// Longest echo we wait for (~5 m round trip).
pub const ECHO_TIMEOUT_US: i64 = 30_000;

const TRIGGER_PULSE_US: u32 = 10;

/// Defaults to ~9 cm (half-full bowl with default calibration).
#[cfg(not(target_os = "espidf"))]
static SIM_ECHO_US: AtomicI64 = AtomicI64::new(525);

/// Serialises in-crate tests that drive [`SIM_ECHO_US`].
#[cfg(all(test, not(target_os = "espidf")))]
pub(crate) static SIM_ECHO_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_echo_us(round_trip_us: i64) {
    SIM_ECHO_US.store(round_trip_us, Ordering::Relaxed);
}

pub struct UltrasonicSensor {
    trig_gpio: i32,
    echo_gpio: i32,
    last_sample_us: i64,
    total_reads: u32,
    timeouts: u32,
}

impl UltrasonicSensor {
    pub fn new(trig_gpio: i32, echo_gpio: i32) -> Self {
        Self {
            trig_gpio,
            echo_gpio,
            last_sample_us: NO_ECHO,
            total_reads: 0,
            timeouts: 0,
        }
    }

    /// Fire one ping and return the echo round-trip time in microseconds,
    /// or [`NO_ECHO`].
    pub fn measure(&mut self, delay: &mut impl DelayNs) -> i64 {
        let sample = self.ping(delay);
        self.total_reads = self.total_reads.wrapping_add(1);
        if sample < 0 {
            self.timeouts = self.timeouts.wrapping_add(1);
        }
        self.last_sample_us = sample;
        sample
    }

    #[cfg(target_os = "espidf")]
    fn ping(&mut self, delay: &mut impl DelayNs) -> i64 {
        hw_init::gpio_write(self.trig_gpio, false);
        delay.delay_us(2);
        hw_init::gpio_write(self.trig_gpio, true);
        delay.delay_us(TRIGGER_PULSE_US);
        hw_init::gpio_write(self.trig_gpio, false);

        let start = hw_init::now_us();
        while !hw_init::gpio_read(self.echo_gpio) {
            if hw_init::now_us() - start > ECHO_TIMEOUT_US {
                return NO_ECHO;
            }
        }
        let rise = hw_init::now_us();
        while hw_init::gpio_read(self.echo_gpio) {
            if hw_init::now_us() - rise > ECHO_TIMEOUT_US {
                return NO_ECHO;
            }
        }
        hw_init::now_us() - rise
    }

    #[cfg(not(target_os = "espidf"))]
    fn ping(&mut self, delay: &mut impl DelayNs) -> i64 {
        delay.delay_us(TRIGGER_PULSE_US);
        let sample = SIM_ECHO_US.load(Ordering::Relaxed);
        if sample > ECHO_TIMEOUT_US { NO_ECHO } else { sample }
    }

    pub fn last_sample_us(&self) -> i64 {
        self.last_sample_us
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    pub fn timeouts(&self) -> u32 {
        self.timeouts
    }

    pub fn pins(&self) -> (i32, i32) {
        (self.trig_gpio, self.echo_gpio)
    }
}
