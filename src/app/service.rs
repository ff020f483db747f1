//! Feeding decision engine: the hexagonal core.
//!
//! [`FeederService`] owns the schedule, the auto-feed cooldown, and the
//! dispenser gate.  Once per tick it reconciles the three trigger sources
//! and forwards whatever they requested to the gate, which honours only
//! the first while it is busy.
//!
//! ```text
//!  LevelPort ───▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  TimePort ────▶ │        FeederService         │
//!  Mailbox ─────▶ │ Schedule · AutoFeed · Gate   │ ──▶ ActuatorPort
//!                 └──────────────────────────────┘
//! ```
//!
//! Per-tick order:
//!
//! 1. close the gate if its hold elapsed
//! 2. apply a pending schedule replacement
//! 3. scheduled pass (skipped while civil time is unknown)
//! 4. auto-feed pass (skipped on a sensor fault)
//!
//!    Both wait for the next tick while a cycle from an earlier tick is
//!    still open.
//! 5. manual pass
//! 6. forward requests in order; all but the first hit a busy gate
//!
//! Bookkeeping (slot `last_fired`, auto-feed timestamp) is stamped when a
//! request is produced, whether or not the gate accepts it; only a later
//! request from the same tick can find the gate busy.  Manual
//! requests never touch it.

use heapless::Vec;
use log::{debug, info};

use crate::autofeed::{AutoFeedDecision, AutoFeedState};
use crate::config::FeederConfig;
use crate::dispenser::DispenserController;
use crate::fsm::GateState;
use crate::scheduler::{CivilTime, SLOT_COUNT, Schedule};
use crate::sensors::level::BowlReading;

use super::commands::PendingCommands;
use super::events::{AppEvent, DispenseTrigger, StatusSnapshot};
use super::gateway::CommandMailbox;
use super::ports::{ActuatorPort, EventSink, LevelPort, TimePort};

/// Upper bound on requests one tick can produce: every slot, one
/// auto-feed, one manual.
pub const MAX_REQUESTS_PER_TICK: usize = SLOT_COUNT + 2;

/// Everything the engine sees for one tick.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Local wall-clock time; `None` while unsynced.
    pub civil: Option<CivilTime>,
    /// Milliseconds since boot.
    pub monotonic_ms: u64,
    pub bowl: BowlReading,
    pub commands: PendingCommands,
}

/// What one tick asked for and what actually moved the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Every dispense request produced, in pass order.
    pub requested: Vec<DispenseTrigger, MAX_REQUESTS_PER_TICK>,
    /// The request that started a gate cycle, if any.
    pub dispensed: Option<DispenseTrigger>,
}

// ───────────────────────────────────────────────────────────────
// FeederService
// ───────────────────────────────────────────────────────────────

pub struct FeederService {
    schedule: Schedule,
    auto_feed: AutoFeedState,
    dispenser: DispenserController,
    last_bowl: Option<BowlReading>,
    last_civil: Option<CivilTime>,
    deferral_reported: bool,
    tick_count: u64,
}

impl FeederService {
    /// Build the engine from configuration.  Does not touch hardware
    /// until [`start`](Self::start).
    pub fn new(config: &FeederConfig) -> Self {
        Self {
            schedule: Schedule::new(config.default_schedule),
            auto_feed: AutoFeedState::new(
                config.auto_feed_threshold_percent,
                config.auto_feed_min_interval_ms,
            ),
            dispenser: DispenserController::new(
                u64::from(config.gate_hold_ms),
                config.gate_closed_angle,
                config.gate_open_angle,
            ),
            last_bowl: None,
            last_civil: None,
            deferral_reported: false,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Park the gate closed and announce the boot schedule.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_gate_angle(self.dispenser.gate_angle());
        sink.emit(&AppEvent::Started {
            slots: self.schedule.times(),
            threshold_percent: self.auto_feed.threshold_percent(),
        });
        info!(
            "FeederService started: {} active slot(s), auto-feed <= {}%",
            self.schedule.active_count(),
            self.auto_feed.threshold_percent()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Gather this tick's inputs from the ports and run [`evaluate`](Self::evaluate).
    ///
    /// The `hw` parameter satisfies **both** [`LevelPort`] and
    /// [`ActuatorPort`] so one adapter can own all peripherals.
    pub fn tick(
        &mut self,
        hw: &mut (impl LevelPort + ActuatorPort),
        clock: &impl TimePort,
        mailbox: &CommandMailbox,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        let tick = Tick {
            civil: clock.civil_time(),
            monotonic_ms: clock.uptime_ms(),
            bowl: hw.read_bowl(),
            commands: mailbox.take_pending(),
        };
        self.evaluate(tick, hw, sink)
    }

    /// Run one decision cycle.  Never fails; every fault degrades to
    /// "do nothing" for the affected pass.
    pub fn evaluate(
        &mut self,
        tick: Tick,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.tick_count += 1;
        self.last_bowl = Some(tick.bowl);
        self.last_civil = tick.civil;

        // 1. Finish a cycle whose hold ran out since the last poll
        self.poll_actuator(tick.monotonic_ms, hw, sink);

        // 2. Schedule replacement lands before the scheduled pass
        if let Some(slots) = tick.commands.schedule {
            self.schedule.replace(slots);
            sink.emit(&AppEvent::ScheduleApplied(slots));
        }

        let mut outcome = TickOutcome::default();

        // 3-4. Passes that stamp bookkeeping run only on a closed gate
        if self.dispenser.is_busy() {
            debug!(
                "Tick {}: gate still open, scheduled and auto-feed passes wait",
                self.tick_count
            );
        } else {
            self.scheduled_pass(tick.civil, &mut outcome);
            self.auto_feed_pass(tick.bowl, tick.monotonic_ms, &mut outcome, sink);
        }

        // 5. Manual pass
        if tick.commands.manual {
            Self::request(&mut outcome, DispenseTrigger::Manual);
        }

        // 6. Forward in order; the busy guard keeps only the first
        for &trigger in &outcome.requested {
            match self.dispenser.dispense(tick.monotonic_ms) {
                Ok(()) => {
                    hw.set_gate_angle(self.dispenser.gate_angle());
                    sink.emit(&AppEvent::DispenseStarted(trigger));
                    outcome.dispensed = Some(trigger);
                }
                Err(_) => sink.emit(&AppEvent::DispenseSkipped(trigger)),
            }
        }

        outcome
    }

    /// Advance the gate.  Safe to call far more often than `evaluate`;
    /// the main loop does so every gate-poll period.  Returns `true` when
    /// a cycle just completed.
    pub fn poll_actuator(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.dispenser.poll(now_ms) {
            return false;
        }
        hw.set_gate_angle(self.dispenser.gate_angle());
        sink.emit(&AppEvent::DispenseCompleted {
            cycles: self.dispenser.completed_cycles(),
        });
        true
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot for the gateway's status export.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            bowl: self.last_bowl,
            civil_time: self.last_civil,
            threshold_percent: self.auto_feed.threshold_percent(),
            slots: self.schedule.times(),
            gate: self.dispenser.state(),
            dispense_cycles: self.dispenser.completed_cycles(),
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn auto_feed(&self) -> &AutoFeedState {
        &self.auto_feed
    }

    pub fn gate_state(&self) -> GateState {
        self.dispenser.state()
    }

    /// Total ticks evaluated since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn scheduled_pass(&mut self, civil: Option<CivilTime>, outcome: &mut TickOutcome) {
        match civil {
            Some(now) => {
                for slot in self.schedule.evaluate(&now) {
                    Self::request(outcome, DispenseTrigger::Scheduled { slot: slot as u8 });
                }
            }
            None => debug!("Tick {}: civil time unknown, scheduled pass skipped", self.tick_count),
        }
    }

    /// Reports a cooldown deferral once per low-bowl episode.
    fn auto_feed_pass(
        &mut self,
        bowl: BowlReading,
        now_ms: u64,
        outcome: &mut TickOutcome,
        sink: &mut impl EventSink,
    ) {
        match self.auto_feed.evaluate(bowl, now_ms) {
            AutoFeedDecision::Fire => {
                self.deferral_reported = false;
                let percent = bowl.percent().unwrap_or(0);
                Self::request(outcome, DispenseTrigger::AutoFeed { percent });
            }
            AutoFeedDecision::Deferred { remaining_ms } => {
                if !self.deferral_reported {
                    self.deferral_reported = true;
                    sink.emit(&AppEvent::AutoFeedDeferred {
                        percent: bowl.percent().unwrap_or(0),
                        remaining_ms,
                    });
                }
            }
            AutoFeedDecision::SensorFault => {
                if let BowlReading::Fault(e) = bowl {
                    sink.emit(&AppEvent::SensorFault(e));
                }
            }
            AutoFeedDecision::Satisfied => self.deferral_reported = false,
        }
    }

    fn request(outcome: &mut TickOutcome, trigger: DispenseTrigger) {
        // Sized for the worst case, so this cannot overflow.
        let _ = outcome.requested.push(trigger);
    }
}
