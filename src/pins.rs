//! GPIO / peripheral pin assignments for the PetFeeder board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Gate servo (SG90-class hobby servo)
// ---------------------------------------------------------------------------

/// LEDC PWM output to the servo signal line.
pub const SERVO_PWM_GPIO: i32 = 13;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Pulse width at 0°.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2500;

// ---------------------------------------------------------------------------
// Bowl level sensor (HC-SR04 ultrasonic)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs pulse starts a ping.
pub const TRIG_GPIO: i32 = 5;
/// Digital input: high for the echo round-trip time.
/// Routed through a 5 V → 3.3 V divider.
pub const ECHO_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// User input
// ---------------------------------------------------------------------------

/// Momentary "feed now" button, active low with internal pull-up.
pub const FEED_BUTTON_GPIO: i32 = 0;
