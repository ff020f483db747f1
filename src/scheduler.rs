//! Daily feeding schedule.
//!
//! Up to [`SLOT_COUNT`] independent slots, each naming an hour and minute
//! of civil time.  A slot fires when a tick lands inside its minute and it
//! has not fired in the last [`REFIRE_GUARD_SECS`].  The guard is 23 hours
//! rather than 24 so tick jitter and daylight-saving shifts never push the
//! next day's firing outside the window.
//!
//! ```text
//!   tick(civil) ──▶ for each slot:
//!                     hour == -1 ─────────────────────────▶ skip
//!                     (h, m) != (slot.h, slot.m) ─────────▶ skip
//!                     fired < 23h ago ────────────────────▶ skip
//!                     otherwise ──▶ last_fired = epoch ──▶ dispense request
//! ```
//!
//! Replacing the schedule re-arms every slot, so a changed time can fire
//! on the same day it was entered.

use core::fmt;

use heapless::Vec;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, SlotField};

// ═══════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════

/// Number of configurable daily feeding slots.
pub const SLOT_COUNT: usize = 3;

/// Hour value that marks a slot as disabled.
pub const DISABLED_HOUR: i8 = -1;

/// Minimum spacing between two firings of the same slot.
pub const REFIRE_GUARD_SECS: i64 = 23 * 60 * 60;

// ═══════════════════════════════════════════════════════════════
//  Civil time
// ═══════════════════════════════════════════════════════════════

/// Wall-clock time as seen by the tick driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CivilTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Seconds since the Unix epoch.
    pub epoch_secs: i64,
}

impl CivilTime {
    /// Derive hour/minute/second from an epoch timestamp and a fixed
    /// UTC offset.
    pub fn from_epoch(epoch_secs: i64, utc_offset_secs: i32) -> Self {
        let local = epoch_secs + utc_offset_secs as i64;
        let secs_of_day = local.rem_euclid(86_400);
        Self {
            hour: (secs_of_day / 3600) as u8,
            minute: ((secs_of_day % 3600) / 60) as u8,
            second: (secs_of_day % 60) as u8,
            epoch_secs,
        }
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Slot times
// ═══════════════════════════════════════════════════════════════

/// Unvalidated slot as submitted through the gateway form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub hour: i32,
    pub minute: i32,
}

/// A single field outside its legal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRangeError {
    pub field: SlotField,
    pub value: i32,
}

impl fmt::Display for SlotRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} out of range ({})", self.field, self.value)
    }
}

/// A validated slot time: hour in `-1..=23`, minute in `0..=59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotRequest", into = "SlotRequest")]
pub struct SlotTime {
    hour: i8,
    minute: u8,
}

impl SlotTime {
    /// A slot that never fires.
    pub const DISABLED: Self = Self {
        hour: DISABLED_HOUR,
        minute: 0,
    };

    /// Build a slot from raw form values.
    pub fn new(hour: i32, minute: i32) -> Result<Self, SlotRangeError> {
        if !(-1..=23).contains(&hour) {
            return Err(SlotRangeError {
                field: SlotField::Hour,
                value: hour,
            });
        }
        if !(0..=59).contains(&minute) {
            return Err(SlotRangeError {
                field: SlotField::Minute,
                value: minute,
            });
        }
        Ok(Self {
            hour: hour as i8,
            minute: minute as u8,
        })
    }

    /// Constructor for compiled-in defaults; use it in `const` items so a
    /// bad literal fails the build.  Runtime input goes through [`Self::new`].
    pub(crate) const fn at(hour: u8, minute: u8) -> Self {
        assert!(hour <= 23 && minute <= 59);
        Self {
            hour: hour as i8,
            minute,
        }
    }

    pub fn hour(self) -> i8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn is_enabled(self) -> bool {
        self.hour != DISABLED_HOUR
    }

    /// True when `now` falls inside this slot's minute.
    pub fn matches(self, now: &CivilTime) -> bool {
        self.is_enabled() && self.hour as u8 == now.hour && self.minute == now.minute
    }
}

impl TryFrom<SlotRequest> for SlotTime {
    type Error = SlotRangeError;

    fn try_from(raw: SlotRequest) -> Result<Self, Self::Error> {
        Self::new(raw.hour, raw.minute)
    }
}

impl From<SlotTime> for SlotRequest {
    fn from(t: SlotTime) -> Self {
        Self {
            hour: t.hour as i32,
            minute: t.minute as i32,
        }
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_enabled() {
            write!(f, "{:02}:{:02}", self.hour, self.minute)
        } else {
            write!(f, "off")
        }
    }
}

/// Validate a whole slot set.  The first bad field rejects everything.
pub fn validate_slots(
    raw: &[SlotRequest; SLOT_COUNT],
) -> Result<[SlotTime; SLOT_COUNT], ScheduleError> {
    let mut out = [SlotTime::DISABLED; SLOT_COUNT];
    for (slot, (req, dst)) in raw.iter().zip(out.iter_mut()).enumerate() {
        *dst = SlotTime::try_from(*req).map_err(|e| ScheduleError::OutOfRange {
            slot,
            field: e.field,
            value: e.value,
        })?;
    }
    Ok(out)
}

// ═══════════════════════════════════════════════════════════════
//  Schedule state
// ═══════════════════════════════════════════════════════════════

/// A slot plus its firing bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub time: SlotTime,
    /// Epoch seconds of the last firing; `None` means never.
    pub last_fired_epoch: Option<i64>,
}

impl ScheduleSlot {
    fn armed(time: SlotTime) -> Self {
        Self {
            time,
            last_fired_epoch: None,
        }
    }

    /// Whether this slot qualifies to fire at `now`.
    ///
    /// A backwards clock step leaves `epoch - last` negative, which stays
    /// inside the guard.
    pub fn is_due(&self, now: &CivilTime) -> bool {
        if !self.time.matches(now) {
            return false;
        }
        match self.last_fired_epoch {
            None => true,
            Some(last) => now.epoch_secs - last >= REFIRE_GUARD_SECS,
        }
    }
}

/// The engine-owned schedule.  Only whole-set replacement is possible
/// from outside.
#[derive(Debug, Clone)]
pub struct Schedule {
    slots: [ScheduleSlot; SLOT_COUNT],
}

impl Schedule {
    pub fn new(times: [SlotTime; SLOT_COUNT]) -> Self {
        Self {
            slots: times.map(ScheduleSlot::armed),
        }
    }

    /// Swap in a new slot set and re-arm every slot.
    pub fn replace(&mut self, times: [SlotTime; SLOT_COUNT]) {
        self.slots = times.map(ScheduleSlot::armed);
        info!(
            "Scheduler: replaced with [{}, {}, {}], all slots re-armed",
            times[0], times[1], times[2]
        );
    }

    /// Scheduled-trigger pass.  Returns the indices of slots that fired,
    /// in slot order, and stamps each with `now.epoch_secs`.
    pub fn evaluate(&mut self, now: &CivilTime) -> Vec<usize, SLOT_COUNT> {
        let mut fired = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_due(now) {
                slot.last_fired_epoch = Some(now.epoch_secs);
                info!("Scheduler: slot {} ({}) fired at {}", i + 1, slot.time, now);
                // Capacity equals the slot count, so this cannot overflow.
                let _ = fired.push(i);
            }
        }
        fired
    }

    pub fn times(&self) -> [SlotTime; SLOT_COUNT] {
        self.slots.map(|s| s.time)
    }

    pub fn slot(&self, index: usize) -> Option<&ScheduleSlot> {
        self.slots.get(index)
    }

    /// Number of enabled slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.time.is_enabled()).count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
