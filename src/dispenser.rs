//! Dispenser gate controller.
//!
//! Wraps the gate FSM behind a busy-guarded `dispense()` and a `poll()`
//! that the main loop calls every gate-poll period.  The controller never
//! blocks: opening the gate returns immediately and the close happens on
//! a later poll once the hold time has elapsed.
//!
//! ```text
//!   dispense(now) ─┬─ Closed ─────▶ Dispensing, Ok(())
//!                  └─ Dispensing ─▶ Err(Busy)
//!   poll(now) ──── Dispensing && held ≥ hold_ms ─▶ Closed, returns true
//! ```

use crate::error::ActuatorError;
use crate::fsm::context::GateContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, GateState};

pub struct DispenserController {
    fsm: Fsm,
    ctx: GateContext,
}

impl DispenserController {
    /// Build the controller with the gate closed.
    pub fn new(hold_ms: u64, closed_angle: u8, open_angle: u8) -> Self {
        let mut ctx = GateContext::new(hold_ms, closed_angle, open_angle);
        let mut fsm = Fsm::new(build_state_table(), GateState::Closed);
        fsm.start(&mut ctx);
        Self { fsm, ctx }
    }

    /// Start one open-hold-close cycle.  Rejected while a cycle runs.
    pub fn dispense(&mut self, now_ms: u64) -> Result<(), ActuatorError> {
        if self.is_busy() {
            return Err(ActuatorError::Busy);
        }
        self.ctx.now_ms = now_ms;
        self.fsm.force_transition(GateState::Dispensing, &mut self.ctx);
        Ok(())
    }

    /// Advance the gate.  Returns `true` on the poll that closes it.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        self.ctx.now_ms = now_ms;
        matches!(self.fsm.poll(&mut self.ctx), Some(GateState::Closed))
    }

    pub fn is_busy(&self) -> bool {
        self.fsm.current_state() == GateState::Dispensing
    }

    pub fn state(&self) -> GateState {
        self.fsm.current_state()
    }

    /// Servo angle the gate should currently be held at.
    pub fn gate_angle(&self) -> u8 {
        self.ctx.command_angle
    }

    /// Completed open→close cycles since boot.
    pub fn completed_cycles(&self) -> u32 {
        self.ctx.completed_cycles
    }
}
