//! Integration tests for the tick → decision engine → gate pipeline.
//!
//! Each test drives `FeederService::tick` through the same ports the
//! firmware uses, with a scripted clock, bowl reading and mailbox.

use petfeeder::app::commands::AppCommand;
use petfeeder::app::events::{AppEvent, DispenseTrigger};
use petfeeder::app::gateway::CommandMailbox;
use petfeeder::app::service::{FeederService, TickOutcome};
use petfeeder::config::FeederConfig;
use petfeeder::error::SensorError;
use petfeeder::fsm::GateState;
use petfeeder::scheduler::{CivilTime, SlotTime};
use petfeeder::sensors::level::{BowlReading, LevelAdapter, LevelCalibration};

use crate::mock_hw::{HOUR_MS, MINUTE_MS, MockClock, MockHardware, RecordingSink, civil, slot};

const OPEN: u8 = 90;

struct Rig {
    app: FeederService,
    hw: MockHardware,
    clock: MockClock,
    mailbox: CommandMailbox,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: FeederConfig) -> Self {
        let mut hw = MockHardware::new();
        let mut sink = RecordingSink::new();
        let mut app = FeederService::new(&config);
        app.start(&mut hw, &mut sink);
        Self {
            app,
            hw,
            clock: MockClock::new(),
            mailbox: CommandMailbox::new(),
            sink,
        }
    }

    fn with_schedule(slots: [SlotTime; 3]) -> Self {
        Self::new(FeederConfig {
            default_schedule: slots,
            ..FeederConfig::default()
        })
    }

    fn tick(&mut self, uptime_ms: u64, now: Option<CivilTime>) -> TickOutcome {
        self.clock.set(uptime_ms, now);
        self.app
            .tick(&mut self.hw, &self.clock, &self.mailbox, &mut self.sink)
    }

    fn scheduled_fires(&self) -> usize {
        self.sink
            .started()
            .iter()
            .filter(|t| matches!(t, DispenseTrigger::Scheduled { .. }))
            .count()
    }
}

// ── Scheduled pass ────────────────────────────────────────────

#[test]
fn disabled_slots_never_fire_across_a_whole_day() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);

    for minute_of_day in 0..(24 * 60) {
        let (h, m) = ((minute_of_day / 60) as u8, (minute_of_day % 60) as u8);
        let out = rig.tick(minute_of_day as u64 * MINUTE_MS, Some(civil(0, h, m, 0)));
        assert!(out.requested.is_empty(), "nothing should fire at {h:02}:{m:02}");
    }
    assert_eq!(rig.scheduled_fires(), 0);
    assert_eq!(rig.app.schedule().active_count(), 0);
}

#[test]
fn slot_fires_once_then_ignores_the_rest_of_its_minute() {
    let mut rig = Rig::with_schedule([slot(7, 0), SlotTime::DISABLED, SlotTime::DISABLED]);
    let base = 7 * HOUR_MS;

    let first = rig.tick(base, Some(civil(0, 7, 0, 0)));
    assert_eq!(first.dispensed, Some(DispenseTrigger::Scheduled { slot: 0 }));
    let stamped = rig.app.schedule().slot(0).unwrap().last_fired_epoch;
    assert_eq!(stamped, Some(civil(0, 7, 0, 0).epoch_secs));

    for s in 1..60u8 {
        let out = rig.tick(base + u64::from(s) * 1000, Some(civil(0, 7, 0, s)));
        assert!(out.requested.is_empty(), "refired at second {s}");
    }
    assert_eq!(rig.scheduled_fires(), 1);
}

#[test]
fn repeated_civil_time_within_guard_does_not_refire() {
    let mut rig = Rig::with_schedule([slot(7, 0), SlotTime::DISABLED, SlotTime::DISABLED]);

    rig.tick(0, Some(civil(0, 7, 0, 0)));
    // Clock anomaly: the same civil second arrives again later.
    let out = rig.tick(5_000, Some(civil(0, 7, 0, 0)));
    assert!(out.requested.is_empty());
    assert_eq!(rig.scheduled_fires(), 1);
}

#[test]
fn slot_fires_again_next_day() {
    let mut rig = Rig::with_schedule([slot(7, 0), SlotTime::DISABLED, SlotTime::DISABLED]);

    rig.tick(0, Some(civil(0, 7, 0, 0)));
    let out = rig.tick(24 * HOUR_MS, Some(civil(1, 7, 0, 0)));
    assert_eq!(out.dispensed, Some(DispenseTrigger::Scheduled { slot: 0 }));
    assert_eq!(rig.scheduled_fires(), 2);
}

#[test]
fn backwards_clock_step_stays_guarded() {
    let mut rig = Rig::with_schedule([slot(7, 0), SlotTime::DISABLED, SlotTime::DISABLED]);

    rig.tick(0, Some(civil(1, 7, 0, 0)));
    // Wall clock jumps back a full day.
    let out = rig.tick(60_000, Some(civil(0, 7, 0, 30)));
    assert!(out.requested.is_empty());
}

#[test]
fn two_slots_same_minute_both_requested_only_first_dispensed() {
    let mut rig = Rig::with_schedule([slot(9, 15), slot(9, 15), SlotTime::DISABLED]);

    let out = rig.tick(0, Some(civil(0, 9, 15, 0)));
    assert_eq!(
        out.requested.as_slice(),
        &[DispenseTrigger::Scheduled { slot: 0 }, DispenseTrigger::Scheduled { slot: 1 }]
    );
    assert_eq!(out.dispensed, Some(DispenseTrigger::Scheduled { slot: 0 }));
    assert_eq!(rig.sink.skipped(), vec![DispenseTrigger::Scheduled { slot: 1 }]);
    // Both slots are consumed for the day even though one was skipped.
    assert!(rig.app.schedule().slot(1).unwrap().last_fired_epoch.is_some());
}

#[test]
fn unsynced_clock_skips_schedule_but_not_auto_feed() {
    let mut rig = Rig::with_schedule([slot(0, 0), SlotTime::DISABLED, SlotTime::DISABLED]);
    rig.hw.bowl = BowlReading::Level(5);

    let out = rig.tick(0, None);
    assert_eq!(out.requested.as_slice(), &[DispenseTrigger::AutoFeed { percent: 5 }]);
    assert_eq!(rig.app.schedule().slot(0).unwrap().last_fired_epoch, None);
}

// ── Schedule replacement ──────────────────────────────────────

#[test]
fn replacement_rearms_and_fires_in_the_same_tick() {
    let mut rig = Rig::with_schedule([slot(7, 0), SlotTime::DISABLED, SlotTime::DISABLED]);
    rig.tick(0, Some(civil(0, 7, 0, 0)));
    assert_eq!(rig.scheduled_fires(), 1);

    // Same times re-submitted: every slot is re-armed.
    let slots = [slot(7, 0), slot(12, 0), SlotTime::DISABLED];
    rig.mailbox.post(AppCommand::ReplaceSchedule(slots));
    let out = rig.tick(30_000, Some(civil(0, 7, 0, 30)));

    assert_eq!(out.dispensed, Some(DispenseTrigger::Scheduled { slot: 0 }));
    assert_eq!(rig.app.schedule().times(), slots);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::ScheduleApplied(s) if *s == slots)));
}

#[test]
fn replacement_is_atomic_and_latest_wins() {
    let mut rig = Rig::new(FeederConfig::default());
    rig.mailbox.post(AppCommand::ReplaceSchedule([slot(6, 0); 3]));
    rig.mailbox.post(AppCommand::ReplaceSchedule([
        slot(10, 0),
        SlotTime::DISABLED,
        slot(22, 45),
    ]));
    rig.tick(0, Some(civil(0, 6, 0, 0)));

    assert_eq!(
        rig.app.schedule().times(),
        [slot(10, 0), SlotTime::DISABLED, slot(22, 45)]
    );
    assert_eq!(rig.scheduled_fires(), 0);
}

// ── Auto-feed pass ────────────────────────────────────────────

#[test]
fn low_bowl_cooldown_scenario() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);
    rig.hw.bowl = BowlReading::Level(15);

    // First low tick after boot fires.
    let t0 = 10 * MINUTE_MS;
    assert_eq!(
        rig.tick(t0, None).dispensed,
        Some(DispenseTrigger::AutoFeed { percent: 15 })
    );

    // 30 minutes later: deferred, bookkeeping untouched.
    let out = rig.tick(t0 + 30 * MINUTE_MS, None);
    assert!(out.requested.is_empty());
    assert_eq!(rig.app.auto_feed().last_fired_ms(), Some(t0));
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::AutoFeedDeferred { percent: 15, remaining_ms } if *remaining_ms == 30 * MINUTE_MS
    )));

    // 61 minutes after the first: fires again.
    let out = rig.tick(t0 + 61 * MINUTE_MS, None);
    assert_eq!(out.dispensed, Some(DispenseTrigger::AutoFeed { percent: 15 }));
}

#[test]
fn auto_feed_at_most_once_per_interval_over_many_ticks() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);
    rig.hw.bowl = BowlReading::Level(0);

    // Two hours of one-second ticks, stopping just short of the third hour mark.
    for s in 0..(2 * 3600) {
        rig.tick(s * 1000, None);
    }
    let autos = rig
        .sink
        .started()
        .into_iter()
        .filter(|t| matches!(t, DispenseTrigger::AutoFeed { .. }))
        .count();
    assert_eq!(autos, 2);
    assert_eq!(rig.app.auto_feed().last_fired_ms(), Some(HOUR_MS));
}

#[test]
fn cooldown_deferral_is_reported_once_per_low_bowl_episode() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);
    let deferrals = |rig: &Rig| {
        rig.sink
            .events
            .iter()
            .filter(|e| matches!(e, AppEvent::AutoFeedDeferred { .. }))
            .count()
    };

    rig.hw.bowl = BowlReading::Level(15);
    rig.tick(0, None);
    for s in 1..=600u64 {
        rig.tick(s * 1000, None);
    }
    assert_eq!(deferrals(&rig), 1);

    // Refilled, then low again while still cooling down.
    rig.hw.bowl = BowlReading::Level(50);
    rig.tick(601_000, None);
    rig.hw.bowl = BowlReading::Level(15);
    rig.tick(602_000, None);
    rig.tick(603_000, None);
    assert_eq!(deferrals(&rig), 2);
}

#[test]
fn threshold_is_inclusive() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);
    rig.hw.bowl = BowlReading::Level(21);
    assert!(rig.tick(0, None).requested.is_empty());

    rig.hw.bowl = BowlReading::Level(20);
    assert_eq!(
        rig.tick(1000, None).dispensed,
        Some(DispenseTrigger::AutoFeed { percent: 20 })
    );
}

#[test]
fn far_echo_faults_and_leaves_cooldown_alone() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);
    rig.hw.bowl = BowlReading::Level(10);
    rig.tick(0, None);
    let before = rig.app.auto_feed().last_fired_ms();

    // 40 cm with a 15 cm empty reference is beyond 2× empty.
    let level = LevelAdapter::new(LevelCalibration::default());
    rig.hw.bowl = level.read_distance(40.0);
    assert_eq!(rig.hw.bowl, BowlReading::Fault(SensorError::OutOfRange));

    rig.app.poll_actuator(1_000, &mut rig.hw, &mut rig.sink);
    rig.sink.clear();
    let out = rig.tick(2 * HOUR_MS, None);
    assert!(out.requested.is_empty());
    assert_eq!(rig.app.auto_feed().last_fired_ms(), before);
    assert!(matches!(
        rig.sink.events.as_slice(),
        [AppEvent::SensorFault(SensorError::OutOfRange)]
    ));
}

// ── Manual pass ───────────────────────────────────────────────

#[test]
fn manual_dispense_ignores_cooldown_and_bookkeeping() {
    let mut rig = Rig::with_schedule([slot(7, 0), SlotTime::DISABLED, SlotTime::DISABLED]);
    rig.hw.bowl = BowlReading::Level(10);
    rig.tick(0, Some(civil(0, 6, 59, 0)));
    let auto_before = rig.app.auto_feed().last_fired_ms();

    rig.mailbox.post(AppCommand::ManualDispense);
    let out = rig.tick(5 * MINUTE_MS, Some(civil(0, 7, 4, 0)));

    assert_eq!(out.requested.as_slice(), &[DispenseTrigger::Manual]);
    assert_eq!(out.dispensed, Some(DispenseTrigger::Manual));
    assert_eq!(rig.app.auto_feed().last_fired_ms(), auto_before);
    assert_eq!(rig.app.schedule().slot(0).unwrap().last_fired_epoch, None);
}

#[test]
fn manual_while_gate_open_is_skipped() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);

    rig.mailbox.post(AppCommand::ManualDispense);
    rig.tick(0, None);
    assert_eq!(rig.app.gate_state(), GateState::Dispensing);

    // Inside the 900 ms hold.
    rig.mailbox.post(AppCommand::ManualDispense);
    let out = rig.tick(500, None);
    assert_eq!(out.requested.as_slice(), &[DispenseTrigger::Manual]);
    assert_eq!(out.dispensed, None);
    assert_eq!(rig.sink.skipped(), vec![DispenseTrigger::Manual]);
    assert_eq!(rig.hw.opens(OPEN), 1);
}

#[test]
fn slot_waits_for_a_gate_left_open_by_an_earlier_tick() {
    // A hold longer than the tick keeps the manual cycle open into 07:00.
    let mut rig = Rig::new(FeederConfig {
        gate_hold_ms: 5_000,
        default_schedule: [slot(7, 0), SlotTime::DISABLED, SlotTime::DISABLED],
        ..FeederConfig::default()
    });
    rig.mailbox.post(AppCommand::ManualDispense);
    rig.tick(1, Some(civil(0, 6, 59, 59)));

    for s in 0..60u8 {
        rig.tick(1_000 + u64::from(s) * 1_000, Some(civil(0, 7, 0, s)));
    }

    assert_eq!(rig.scheduled_fires(), 1);
    assert!(rig.sink.skipped().is_empty());
    assert_eq!(
        rig.app.schedule().slot(0).unwrap().last_fired_epoch,
        Some(civil(0, 7, 0, 5).epoch_secs)
    );
}

#[test]
fn auto_feed_waits_for_a_gate_left_open_by_an_earlier_tick() {
    let mut rig = Rig::new(FeederConfig {
        gate_hold_ms: 5_000,
        default_schedule: [SlotTime::DISABLED; 3],
        ..FeederConfig::default()
    });
    rig.mailbox.post(AppCommand::ManualDispense);
    rig.tick(0, None);

    rig.hw.bowl = BowlReading::Level(10);
    let out = rig.tick(1_000, None);
    assert!(out.requested.is_empty());
    assert_eq!(rig.app.auto_feed().last_fired_ms(), None);

    let out = rig.tick(5_000, None);
    assert_eq!(out.dispensed, Some(DispenseTrigger::AutoFeed { percent: 10 }));
    assert_eq!(rig.app.auto_feed().last_fired_ms(), Some(5_000));
    assert!(rig.sink.skipped().is_empty());
}

#[test]
fn scheduled_auto_and_manual_in_one_tick_move_the_gate_once() {
    let mut rig = Rig::with_schedule([slot(8, 0), SlotTime::DISABLED, SlotTime::DISABLED]);
    rig.hw.bowl = BowlReading::Level(3);
    rig.mailbox.post(AppCommand::ManualDispense);

    let out = rig.tick(0, Some(civil(0, 8, 0, 0)));
    assert_eq!(
        out.requested.as_slice(),
        &[
            DispenseTrigger::Scheduled { slot: 0 },
            DispenseTrigger::AutoFeed { percent: 3 },
            DispenseTrigger::Manual,
        ]
    );
    assert_eq!(out.dispensed, Some(DispenseTrigger::Scheduled { slot: 0 }));
    assert_eq!(rig.sink.skipped().len(), 2);
    assert_eq!(rig.hw.opens(OPEN), 1);
}

// ── Gate lifecycle ────────────────────────────────────────────

#[test]
fn gate_opens_holds_and_closes_without_blocking() {
    let mut rig = Rig::with_schedule([SlotTime::DISABLED; 3]);
    assert_eq!(rig.hw.angles, vec![0], "start parks the gate closed");

    rig.mailbox.post(AppCommand::ManualDispense);
    rig.tick(1_000, None);
    assert_eq!(rig.hw.gate_angle(), Some(OPEN));

    // The loop polls every 50 ms between ticks.
    let mut closed_at = None;
    for step in 1..=30u64 {
        let now = 1_000 + step * 50;
        if rig.app.poll_actuator(now, &mut rig.hw, &mut rig.sink) {
            closed_at = Some(now);
        }
    }
    assert_eq!(closed_at, Some(1_900));
    assert_eq!(rig.hw.angles, vec![0, OPEN, 0]);
    assert_eq!(rig.sink.completed(), 1);
    assert_eq!(rig.app.status().dispense_cycles, 1);
}

#[test]
fn status_snapshot_tracks_engine() {
    let mut rig = Rig::new(FeederConfig::default());
    rig.hw.bowl = BowlReading::Level(42);
    let now = civil(0, 12, 34, 56);
    rig.tick(0, Some(now));

    let s = rig.app.status();
    assert_eq!(s.bowl, Some(BowlReading::Level(42)));
    assert_eq!(s.civil_time, Some(now));
    assert_eq!(s.threshold_percent, 20);
    assert_eq!(s.slots, FeederConfig::default().default_schedule);
    assert_eq!(s.gate, GateState::Closed);
    assert_eq!(rig.app.tick_count(), 1);
    assert_eq!(rig.hw.reads, 1);
}
