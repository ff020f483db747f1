//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                    |
//! |------------|---------------|--------------------------------|
//! | `hardware` | LevelPort     | HC-SR04 via GPIO               |
//! |            | ActuatorPort  | Gate servo via LEDC PWM        |
//! | `log_sink` | EventSink     | Serial log output              |
//! | `time`     | TimePort      | esp_timer + system wall clock  |

pub mod hardware;
pub mod log_sink;
pub mod time;
