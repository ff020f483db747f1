//! Mutable context threaded through every gate state handler.
//!
//! Handlers read the clock and hold parameters and write the servo
//! command; the dispenser applies that command to hardware afterwards.

/// Shared context for the gate FSM.
#[derive(Debug, Clone)]
pub struct GateContext {
    // -- Timing --
    /// Monotonic time of the current poll (ms).
    pub now_ms: u64,
    /// Monotonic time the current state was entered (ms).
    pub entered_at_ms: u64,
    /// How long the gate stays open per cycle (ms).
    pub hold_ms: u64,

    // -- Positions --
    pub closed_angle: u8,
    pub open_angle: u8,

    // -- Outputs --
    /// Servo angle the hardware should be at.
    pub command_angle: u8,
    /// Open→close cycles completed since boot.
    pub completed_cycles: u32,
}

impl GateContext {
    pub fn new(hold_ms: u64, closed_angle: u8, open_angle: u8) -> Self {
        Self {
            now_ms: 0,
            entered_at_ms: 0,
            hold_ms,
            closed_angle,
            open_angle,
            command_angle: closed_angle,
            completed_cycles: 0,
        }
    }

    /// Milliseconds since the current state was entered.
    pub fn ms_in_state(&self) -> u64 {
        self.now_ms.saturating_sub(self.entered_at_ms)
    }
}
