//! ESP32 time adapter.
//!
//! Provides monotonic and wall-clock time for the feeder.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer and the SNTP-synced system clock.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` and
//!   `SystemTime` for host-side testing and simulation.

use crate::app::ports::TimePort;
use crate::scheduler::CivilTime;

/// Wall-clock readings before 2020-01-01 mean the clock was never set.
pub const EPOCH_2020: i64 = 1_577_836_800;

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    utc_offset_secs: i32,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Esp32TimeAdapter {
    pub fn new(utc_offset_secs: i32) -> Self {
        Self {
            utc_offset_secs,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time has no preconditions after boot.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Seconds since the Unix epoch, or `None` if the call fails.
    #[cfg(target_os = "espidf")]
    pub fn epoch_secs(&self) -> Option<i64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-pointer; the timezone argument may be null.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        Some(tv.tv_sec as i64)
    }

    /// Seconds since the Unix epoch, or `None` if the call fails.
    #[cfg(not(target_os = "espidf"))]
    pub fn epoch_secs(&self) -> Option<i64> {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs() as i64)
    }

    /// Local time of day.  `None` if the wall clock is not synced yet.
    pub fn civil_time(&self) -> Option<CivilTime> {
        let epoch = self.epoch_secs()?;
        civil_from_epoch(epoch, self.utc_offset_secs)
    }
}

/// Apply the sync check and offset to a raw epoch reading.
pub fn civil_from_epoch(epoch_secs: i64, utc_offset_secs: i32) -> Option<CivilTime> {
    if epoch_secs < EPOCH_2020 {
        return None;
    }
    Some(CivilTime::from_epoch(epoch_secs, utc_offset_secs))
}

impl TimePort for Esp32TimeAdapter {
    fn uptime_ms(&self) -> u64 {
        Esp32TimeAdapter::uptime_ms(self)
    }

    fn civil_time(&self) -> Option<CivilTime> {
        Esp32TimeAdapter::civil_time(self)
    }
}
