//! Gate state handlers and table builder.
//!
//! ```text
//!  CLOSED ──[dispense()]──▶ DISPENSING ──[hold elapsed]──▶ CLOSED
//! ```
//!
//! `Closed` has no outgoing transition of its own: only the dispenser's
//! busy-guarded `dispense()` forces it open.  Once open, the cycle always
//! runs to completion.

use super::context::GateContext;
use super::{GateState, StateDescriptor};
use log::info;

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; GateState::COUNT] {
    [
        // Index 0: Closed
        StateDescriptor {
            id: GateState::Closed,
            name: "Closed",
            on_enter: Some(closed_enter),
            on_exit: None,
            on_update: closed_update,
        },
        // Index 1: Dispensing
        StateDescriptor {
            id: GateState::Dispensing,
            name: "Dispensing",
            on_enter: Some(dispensing_enter),
            on_exit: Some(dispensing_exit),
            on_update: dispensing_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLOSED
// ═══════════════════════════════════════════════════════════════════════════

fn closed_enter(ctx: &mut GateContext) {
    ctx.command_angle = ctx.closed_angle;
}

fn closed_update(_ctx: &mut GateContext) -> Option<GateState> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISPENSING
// ═══════════════════════════════════════════════════════════════════════════

fn dispensing_enter(ctx: &mut GateContext) {
    ctx.command_angle = ctx.open_angle;
    info!("GATE: open to {}°, holding {} ms", ctx.open_angle, ctx.hold_ms);
}

fn dispensing_exit(ctx: &mut GateContext) {
    ctx.completed_cycles = ctx.completed_cycles.wrapping_add(1);
    info!(
        "GATE: closing after {} ms (cycle #{})",
        ctx.ms_in_state(),
        ctx.completed_cycles
    );
}

fn dispensing_update(ctx: &mut GateContext) -> Option<GateState> {
    if ctx.ms_in_state() >= ctx.hold_ms {
        return Some(GateState::Closed);
    }
    None
}
