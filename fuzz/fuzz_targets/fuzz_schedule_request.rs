//! Fuzz target: `Gateway::replace_schedule_json`
//!
//! Drives arbitrary request bodies through the schedule parser and
//! validator and asserts that it never panics, that only accepted bodies
//! reach the mailbox, and that whatever reaches it is in range.
//!
//! cargo fuzz run fuzz_schedule_request

#![no_main]

use libfuzzer_sys::fuzz_target;
use petfeeder::app::gateway::{CommandMailbox, Gateway, GatewayReply};

fuzz_target!(|data: &[u8]| {
    let mailbox = CommandMailbox::new();
    let gateway = Gateway::new(&mailbox);

    let reply = gateway.replace_schedule_json(data);
    let pending = mailbox.take_pending();

    match reply {
        GatewayReply::Accepted => {
            let slots = pending.schedule.expect("accepted schedule must be queued");
            for slot in slots {
                assert!((-1..=23).contains(&slot.hour()));
                assert!(slot.minute() <= 59);
            }
        }
        GatewayReply::Rejected(_) => assert!(pending.is_empty(), "rejected body leaked"),
        GatewayReply::Status(_) => unreachable!("schedule path never renders status"),
    }
    assert!(!pending.manual);
});
