//! Function-pointer finite state machine engine for the dispenser gate.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌────────────┬───────────┬──────────┬────────────────┐  │
//! │  │ GateState  │ on_enter  │ on_exit  │ on_update      │  │
//! │  ├────────────┼───────────┼──────────┼────────────────┤  │
//! │  │ Closed     │ fn(ctx)   │ -        │ fn(ctx)->Opt<> │  │
//! │  │ Dispensing │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Opt<> │  │
//! │  └────────────┴───────────┴──────────┴────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each poll the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next.  All functions receive
//! `&mut GateContext`, which carries the clock, hold duration, and the
//! servo command output.

pub mod context;
pub mod states;

use context::GateContext;
use log::debug;
use serde::Serialize;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Gate positions.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum GateState {
    /// At rest; the only state that accepts a dispense request.
    Closed = 0,
    /// Gate open, holding for the configured duration.
    Dispensing = 1,
}

impl GateState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `GateState`.  Out-of-range falls back
    /// to `Closed` (the safe position) after a debug assertion.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Closed,
            1 => Self::Dispensing,
            _ => {
                debug_assert!(false, "invalid gate state index: {idx}");
                Self::Closed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut GateContext);

/// Signature for the per-poll update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut GateContext) -> Option<GateState>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: GateState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `GateState as usize`.
    table: [StateDescriptor; GateState::COUNT],
    current: usize,
    /// Total transitions taken since start.
    transitions: u32,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; GateState::COUNT], initial: GateState) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, s)| s.id as usize == i),
            "state table out of order"
        );
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    pub fn start(&mut self, ctx: &mut GateContext) {
        debug!("Gate FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Call `on_update` for the current state and follow any transition
    /// it requests.  Returns the new state if one was taken.
    pub fn poll(&mut self, ctx: &mut GateContext) -> Option<GateState> {
        let next = (self.table[self.current].on_update)(ctx)?;
        self.transition(next, ctx);
        Some(next)
    }

    /// Jump directly to `next`, running exit/enter actions.  A no-op if
    /// already there.
    pub fn force_transition(&mut self, next: GateState, ctx: &mut GateContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> GateState {
        GateState::from_index(self.current)
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    fn transition(&mut self, next: GateState, ctx: &mut GateContext) {
        let next_idx = next as usize;
        debug!(
            "Gate FSM: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transitions = self.transitions.wrapping_add(1);
        ctx.entered_at_ms = ctx.now_ms;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
