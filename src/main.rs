//! PetFeeder Firmware: main entry point
//!
//! Hexagonal architecture driven by a single cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink      Esp32TimeAdapter       │
//! │  (Level+Actuator)     (EventSink)       (TimePort)             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            FeederService (pure logic)                  │    │
//! │  │  Schedule · AutoFeed · Gate FSM                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Gateway ──▶ CommandMailbox ◀── feed button                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop wakes every gate-poll period (50 ms by default).  Each wake
//! advances the gate and the button; every tick period it also runs the
//! decision engine.  Nothing in the loop blocks for a dispense.
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use log::{info, warn};

use petfeeder::adapters::hardware::HardwareAdapter;
use petfeeder::adapters::log_sink::LogEventSink;
use petfeeder::adapters::time::Esp32TimeAdapter;
use petfeeder::app::events::AppEvent;
use petfeeder::app::gateway::{CommandMailbox, Gateway};
use petfeeder::app::ports::EventSink;
use petfeeder::app::service::FeederService;
use petfeeder::config::FeederConfig;
use petfeeder::drivers::button::ButtonDriver;
use petfeeder::drivers::servo::ServoDriver;
use petfeeder::drivers::{hw_init, watchdog::Watchdog};
use petfeeder::pins;
use petfeeder::sensors::level::LevelAdapter;
use petfeeder::sensors::ultrasonic::UltrasonicSensor;

/// Single-item command mailboxes shared by the gateway and the loop.
static MAILBOX: CommandMailbox = CommandMailbox::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PetFeeder v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (compiled in, no persistence) ────────
    let config = FeederConfig::default();
    if let Err(e) = config.validate() {
        log::error!("Built-in config rejected: {}, halting", e);
        anyhow::bail!("{e}");
    }

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Nothing useful runs without the gate and sensor.
        log::error!("HAL init failed: {}, halting", e);
        anyhow::bail!("{}", petfeeder::error::Error::from(e));
    }
    if let Err(e) = hw_init::init_isr_service() {
        log::error!("ISR service init failed: {}, feed button disabled", e);
    }
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(
        UltrasonicSensor::new(pins::TRIG_GPIO, pins::ECHO_GPIO),
        LevelAdapter::new(config.level_calibration),
        ServoDriver::new(),
        Ets,
    );
    let clock = Esp32TimeAdapter::new(config.utc_offset_secs);
    let mut log_sink = LogEventSink::new();
    let mut button = ButtonDriver::new(pins::FEED_BUTTON_GPIO);
    let gateway = Gateway::new(&MAILBOX);

    // ── 5. Decision engine ────────────────────────────────────
    let mut app = FeederService::new(&config);
    app.start(&mut hw, &mut log_sink);

    if clock.civil_time().is_none() {
        warn!("Wall clock not synced; scheduled feeds wait for time sync");
    }

    info!("System ready. Entering tick loop.");

    // ── 6. Cooperative loop ───────────────────────────────────
    let tick_ms = u64::from(config.tick_interval_ms);
    let status_ms = u64::from(config.status_interval_secs) * 1000;
    let mut last_tick_ms = clock.uptime_ms();
    let mut last_status_ms = last_tick_ms;

    loop {
        let now_ms = clock.uptime_ms();

        // Gate hold runs independently of the tick.
        app.poll_actuator(now_ms, &mut hw, &mut log_sink);

        // Button presses go through the same mailbox as remote requests.
        if button.tick(now_ms as u32) {
            info!("Button: feed now");
            gateway.manual_dispense();
        }

        if now_ms.wrapping_sub(last_tick_ms) >= tick_ms {
            last_tick_ms = now_ms;
            app.tick(&mut hw, &clock, &MAILBOX, &mut log_sink);
        }

        if now_ms.wrapping_sub(last_status_ms) >= status_ms {
            last_status_ms = now_ms;
            log_sink.emit(&AppEvent::Status(app.status()));
        }

        watchdog.feed();
        FreeRtos::delay_ms(config.gate_poll_interval_ms);
    }
}
