//! Configuration/command gateway boundary.
//!
//! The gateway is whatever front end accepts user input (a web form in
//! the field).  It never touches engine state: it validates requests,
//! drops them into the [`CommandMailbox`], and renders the read-only
//! [`StatusSnapshot`].
//!
//! ```text
//!  HTTP / button ──▶ Gateway ──▶ CommandMailbox ──take_pending()──▶ tick
//!                       ▲
//!                       └──────── status_json(StatusSnapshot)
//! ```
//!
//! Each command kind is a single-item mailbox with last-write-wins
//! semantics: two schedule writes before the next tick leave only the
//! second; two manual requests collapse into one.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{info, warn};

use crate::error::ScheduleError;
use crate::scheduler::{SLOT_COUNT, SlotTime, validate_slots};

use super::commands::{AppCommand, PendingCommands, ScheduleRequest};
use super::events::StatusSnapshot;

// ───────────────────────────────────────────────────────────────
// Mailbox
// ───────────────────────────────────────────────────────────────

pub struct CommandMailbox {
    schedule: Signal<CriticalSectionRawMutex, [SlotTime; SLOT_COUNT]>,
    manual: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for CommandMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandMailbox {
    /// `const` so the mailbox can live in a `static`.
    pub const fn new() -> Self {
        Self {
            schedule: Signal::new(),
            manual: Signal::new(),
        }
    }

    /// Store a command, overwriting any pending one of the same kind.
    pub fn post(&self, cmd: AppCommand) {
        match cmd {
            AppCommand::ReplaceSchedule(slots) => self.schedule.signal(slots),
            AppCommand::ManualDispense => self.manual.signal(()),
        }
    }

    /// Drain both mailboxes.  Called once per tick.
    pub fn take_pending(&self) -> PendingCommands {
        PendingCommands {
            schedule: self.schedule.try_take(),
            manual: self.manual.try_take().is_some(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Replies
// ───────────────────────────────────────────────────────────────

/// Gateway response to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayReply {
    /// Command queued for the next tick.
    Accepted,
    /// Command refused; nothing was queued.
    Rejected(ScheduleError),
    /// Rendered status export.
    Status(String),
}

impl GatewayReply {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Status(_) => 200,
            Self::Accepted => 202,
            Self::Rejected(_) => 400,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Gateway
// ───────────────────────────────────────────────────────────────

pub struct Gateway<'a> {
    mailbox: &'a CommandMailbox,
}

impl<'a> Gateway<'a> {
    pub fn new(mailbox: &'a CommandMailbox) -> Self {
        Self { mailbox }
    }

    /// Validate every slot and queue the whole set, or queue nothing.
    pub fn replace_schedule(&self, req: &ScheduleRequest) -> GatewayReply {
        match validate_slots(&req.slots) {
            Ok(slots) => {
                info!(
                    "Gateway: schedule [{}, {}, {}] queued",
                    slots[0], slots[1], slots[2]
                );
                self.mailbox.post(AppCommand::ReplaceSchedule(slots));
                GatewayReply::Accepted
            }
            Err(e) => {
                warn!("Gateway: schedule rejected: {}", e);
                GatewayReply::Rejected(e)
            }
        }
    }

    /// Decode a JSON body and hand it to [`Self::replace_schedule`].
    pub fn replace_schedule_json(&self, body: &[u8]) -> GatewayReply {
        match Self::parse_schedule_request(body) {
            Ok(req) => self.replace_schedule(&req),
            Err(e) => {
                warn!("Gateway: {}", e);
                GatewayReply::Rejected(e)
            }
        }
    }

    /// Fire-and-forget; the actual dispense is reported by the engine.
    pub fn manual_dispense(&self) -> GatewayReply {
        info!("Gateway: manual dispense queued");
        self.mailbox.post(AppCommand::ManualDispense);
        GatewayReply::Accepted
    }

    pub fn parse_schedule_request(body: &[u8]) -> Result<ScheduleRequest, ScheduleError> {
        serde_json::from_slice(body).map_err(|_| ScheduleError::Malformed)
    }

    pub fn status_json(snapshot: &StatusSnapshot) -> GatewayReply {
        match serde_json::to_string(snapshot) {
            Ok(body) => GatewayReply::Status(body),
            Err(e) => {
                warn!("Gateway: status encode failed: {}", e);
                GatewayReply::Status(String::from("{}"))
            }
        }
    }
}
