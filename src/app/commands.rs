//! Inbound commands to the decision engine.
//!
//! The gateway and the manual-feed button produce these; the
//! [`CommandMailbox`](super::gateway::CommandMailbox) holds at most one of
//! each kind until the next tick samples them.

use serde::{Deserialize, Serialize};

use crate::scheduler::{SLOT_COUNT, SlotRequest, SlotTime};

/// Commands that external sources can send into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Replace all slots at once.  Already validated.
    ReplaceSchedule([SlotTime; SLOT_COUNT]),

    /// Run one dispense cycle now, outside schedule and cooldown.
    ManualDispense,
}

/// Raw schedule form as received by the gateway.
///
/// ```json
/// {"slots":[{"hour":7,"minute":0},{"hour":-1,"minute":0},{"hour":19,"minute":30}]}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub slots: [SlotRequest; SLOT_COUNT],
}

/// Everything the mailbox held at the moment a tick sampled it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCommands {
    pub schedule: Option<[SlotTime; SLOT_COUNT]>,
    pub manual: bool,
}

impl PendingCommands {
    pub fn is_empty(&self) -> bool {
        self.schedule.is_none() && !self.manual
    }
}
