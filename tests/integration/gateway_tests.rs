//! Integration tests for the gateway → mailbox → engine path.
//!
//! Requests go in through `Gateway` exactly as the HTTP front end or the
//! feed button would submit them; the engine picks them up on its tick.

use petfeeder::app::commands::ScheduleRequest;
use petfeeder::app::events::{AppEvent, DispenseTrigger};
use petfeeder::app::gateway::{CommandMailbox, Gateway, GatewayReply};
use petfeeder::app::service::FeederService;
use petfeeder::config::FeederConfig;
use petfeeder::error::{ScheduleError, SlotField};
use petfeeder::scheduler::{SlotRequest, SlotTime};
use petfeeder::sensors::level::BowlReading;

use crate::mock_hw::{MockClock, MockHardware, RecordingSink, civil, slot};

fn request(slots: [(i32, i32); 3]) -> ScheduleRequest {
    ScheduleRequest {
        slots: slots.map(|(hour, minute)| SlotRequest { hour, minute }),
    }
}

fn engine() -> (FeederService, MockHardware, MockClock, RecordingSink) {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut app = FeederService::new(&FeederConfig::default());
    app.start(&mut hw, &mut sink);
    (app, hw, MockClock::new(), sink)
}

#[test]
fn rejected_schedule_leaves_engine_untouched() {
    let mailbox = CommandMailbox::new();
    let gateway = Gateway::new(&mailbox);
    let (mut app, mut hw, clock, mut sink) = engine();
    let before = app.schedule().times();

    for bad in [
        [(24, 0), (8, 0), (9, 0)],
        [(7, 0), (-2, 0), (9, 0)],
        [(7, 0), (8, 0), (9, -1)],
        [(7, 0), (8, 0), (9, 60)],
    ] {
        let reply = gateway.replace_schedule(&request(bad));
        assert_eq!(reply.status_code(), 400, "{bad:?} should be rejected");
    }

    clock.set(0, Some(civil(0, 12, 0, 0)));
    app.tick(&mut hw, &clock, &mailbox, &mut sink);
    assert_eq!(app.schedule().times(), before);
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::ScheduleApplied(_))));
}

#[test]
fn accepted_schedule_applies_on_next_tick() {
    let mailbox = CommandMailbox::new();
    let gateway = Gateway::new(&mailbox);
    let (mut app, mut hw, clock, mut sink) = engine();

    let reply = gateway.replace_schedule_json(
        br#"{"slots":[{"hour":12,"minute":0},{"hour":-1,"minute":30},{"hour":0,"minute":59}]}"#,
    );
    assert_eq!(reply, GatewayReply::Accepted);

    clock.set(0, Some(civil(0, 12, 0, 5)));
    let out = app.tick(&mut hw, &clock, &mailbox, &mut sink);

    assert_eq!(
        app.schedule().times(),
        [
            slot(12, 0),
            SlotTime::new(-1, 30).unwrap(),
            slot(0, 59)
        ]
    );
    assert_eq!(out.dispensed, Some(DispenseTrigger::Scheduled { slot: 0 }));
}

#[test]
fn rejection_reports_first_bad_field() {
    let mailbox = CommandMailbox::new();
    let gateway = Gateway::new(&mailbox);
    assert_eq!(
        gateway.replace_schedule(&request([(7, 0), (8, 0), (30, 99)])),
        GatewayReply::Rejected(ScheduleError::OutOfRange {
            slot: 2,
            field: SlotField::Hour,
            value: 30,
        })
    );
}

#[test]
fn manual_request_is_fire_and_forget() {
    let mailbox = CommandMailbox::new();
    let gateway = Gateway::new(&mailbox);
    let (mut app, mut hw, clock, mut sink) = engine();

    let reply = gateway.manual_dispense();
    assert_eq!(reply.status_code(), 202);
    // Nothing moves until the engine ticks.
    assert_eq!(hw.angles, vec![0]);

    let out = app.tick(&mut hw, &clock, &mailbox, &mut sink);
    assert_eq!(out.dispensed, Some(DispenseTrigger::Manual));
    assert_eq!(sink.started(), vec![DispenseTrigger::Manual]);
}

#[test]
fn rapid_manual_requests_between_ticks_collapse_to_one() {
    let mailbox = CommandMailbox::new();
    let gateway = Gateway::new(&mailbox);
    let (mut app, mut hw, clock, mut sink) = engine();

    for _ in 0..5 {
        gateway.manual_dispense();
    }
    let out = app.tick(&mut hw, &clock, &mailbox, &mut sink);
    assert_eq!(out.requested.len(), 1);

    clock.set(2_000, None);
    let out = app.tick(&mut hw, &clock, &mailbox, &mut sink);
    assert!(out.requested.is_empty());
}

#[test]
fn status_export_renders_snapshot_as_json() {
    let mailbox = CommandMailbox::new();
    let (mut app, mut hw, clock, mut sink) = engine();
    hw.bowl = BowlReading::Level(55);
    clock.set(0, Some(civil(0, 9, 5, 0)));
    app.tick(&mut hw, &clock, &mailbox, &mut sink);

    let reply = Gateway::status_json(&app.status());
    assert_eq!(reply.status_code(), 200);
    let GatewayReply::Status(body) = reply else {
        panic!("expected a status body");
    };

    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["bowl"]["Level"], 55);
    assert_eq!(v["threshold_percent"], 20);
    assert_eq!(v["civil_time"]["hour"], 9);
    assert_eq!(v["civil_time"]["minute"], 5);
    assert_eq!(v["slots"][0]["hour"], 8);
    assert_eq!(v["slots"][2]["hour"], -1);
    assert_eq!(v["gate"], "Closed");
}
