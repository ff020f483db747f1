//! ISR-debounced "feed now" button.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The GPIO fires on the
//! falling edge; the ISR records the raw timestamp into an atomic, and
//! [`ButtonDriver::tick`] (called from the main loop) runs debounce.
//!
//! A press is reported once, after the line has stayed low for
//! [`DEBOUNCE_MS`].  Holding the button does not repeat; it must be
//! released first.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::AtomicBool;
use core::sync::atomic::{AtomicU32, Ordering};

pub const DEBOUNCE_MS: u32 = 50;

/// Raw ISR timestamp (milliseconds since boot, truncated to u32).
/// Written by the ISR, read by the main loop.
static BUTTON_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

#[cfg(not(target_os = "espidf"))]
static SIM_PRESSED: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pressed(pressed: bool) {
    SIM_PRESSED.store(pressed, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Idle,
    DebounceWait { since_ms: u32 },
    Held,
}

pub struct ButtonDriver {
    gpio: i32,
    state: PressState,
    last_isr_ms: u32,
    presses: u32,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: PressState::Idle,
            last_isr_ms: 0,
            presses: 0,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Call from the main loop.  Returns `true` exactly once per
    /// debounced press.
    pub fn tick(&mut self, now_ms: u32) -> bool {
        let isr_ms = BUTTON_ISR_TIMESTAMP.load(Ordering::Acquire);
        let new_edge = isr_ms != 0 && isr_ms != self.last_isr_ms;
        if new_edge {
            self.last_isr_ms = isr_ms;
        }

        match self.state {
            PressState::Idle => {
                if new_edge {
                    self.state = PressState::DebounceWait { since_ms: now_ms };
                }
                false
            }
            PressState::DebounceWait { since_ms } => {
                if now_ms.wrapping_sub(since_ms) < DEBOUNCE_MS {
                    return false;
                }
                if self.is_pressed_hw() {
                    self.state = PressState::Held;
                    self.presses = self.presses.wrapping_add(1);
                    true
                } else {
                    // Bounce or glitch shorter than the window.
                    self.state = PressState::Idle;
                    false
                }
            }
            PressState::Held => {
                if !self.is_pressed_hw() {
                    self.state = PressState::Idle;
                }
                false
            }
        }
    }

    pub fn press_count(&self) -> u32 {
        self.presses
    }

    #[cfg(target_os = "espidf")]
    fn is_pressed_hw(&self) -> bool {
        !crate::drivers::hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_pressed_hw(&self) -> bool {
        SIM_PRESSED.load(Ordering::Relaxed)
    }
}

/// ISR handler: register this on the button GPIO falling edge.
/// Safe to call from interrupt context (lock-free atomic store).
#[allow(unused)]
pub fn button_isr_handler(now_ms: u32) {
    BUTTON_ISR_TIMESTAMP.store(now_ms, Ordering::Release);
}
