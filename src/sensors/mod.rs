//! Bowl level sensing.
//!
//! [`ultrasonic`] produces a raw echo round-trip time each tick;
//! [`level`] turns it into a [`BowlReading`](level::BowlReading).

pub mod level;
pub mod ultrasonic;
