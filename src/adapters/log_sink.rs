//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::sensors::level::BowlReading;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                slots,
                threshold_percent,
            } => {
                info!(
                    "START | slots={} {} {} | auto-feed<={}%",
                    slots[0], slots[1], slots[2], threshold_percent
                );
            }
            AppEvent::DispenseStarted(trigger) => {
                info!("FEED | {}", trigger);
            }
            AppEvent::DispenseCompleted { cycles } => {
                info!("FEED | gate closed | cycles={}", cycles);
            }
            AppEvent::DispenseSkipped(trigger) => {
                info!("SKIP | {} | gate busy", trigger);
            }
            AppEvent::AutoFeedDeferred {
                percent,
                remaining_ms,
            } => {
                info!(
                    "SKIP | bowl {}% low, auto-feed cooldown {}s left",
                    percent,
                    remaining_ms / 1000
                );
            }
            AppEvent::SensorFault(e) => {
                warn!("FAULT | level sensor: {} | auto-feed skipped", e);
            }
            AppEvent::ScheduleApplied(slots) => {
                info!("SCHED | {} {} {}", slots[0], slots[1], slots[2]);
            }
            AppEvent::Status(s) => {
                let bowl = match s.bowl {
                    Some(BowlReading::Level(p)) => format!("{p}%"),
                    Some(BowlReading::Fault(e)) => format!("fault({e})"),
                    None => String::from("-"),
                };
                let clock = s
                    .civil_time
                    .map_or_else(|| String::from("unsynced"), |t| t.to_string());
                info!(
                    "STATUS | time={} | bowl={} | threshold={}% | slots={} {} {} | \
                     gate={:?} | cycles={}",
                    clock,
                    bowl,
                    s.threshold_percent,
                    s.slots[0],
                    s.slots[1],
                    s.slots[2],
                    s.gate,
                    s.dispense_cycles,
                );
            }
        }
    }
}
