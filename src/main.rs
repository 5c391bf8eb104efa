//! AirGuard Firmware — Main Entry Point
//!
//! Hexagonal architecture with an event-driven run loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  HardwareAdapter      LogEventSink       MonotonicClock    │
//! │  (Sensor+Actuator)    (EventSink)        (time source)     │
//! │  WifiLink             MqttSession                          │
//! │  (STA bootstrap)      (SessionPort + event feed)           │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ────────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │            Agent (pure session logic)            │      │
//! │  │  telemetry gating · alarm · command dispatch     │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  Cadence timers (telemetry 2 s · buzzer pulse 500 ms)      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The run loop blocks on the session event channel with a timeout bounded
//! by the nearest cadence deadline, so timers fire on schedule without
//! polling and the CPU idles between events.
#![deny(unused_must_use)]

use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};

use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use airguard::adapters::device_id;
use airguard::adapters::hardware::HardwareAdapter;
use airguard::adapters::log_sink::LogEventSink;
use airguard::adapters::mqtt::MqttSession;
use airguard::adapters::time::MonotonicClock;
use airguard::adapters::wifi::WifiLink;
use airguard::app::agent::Agent;
use airguard::config::SystemConfig;
use airguard::drivers::alarm_led::AlarmLed;
use airguard::drivers::buzzer::Buzzer;
use airguard::drivers::hw_init;
use airguard::sensors::SensorHub;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("AirGuard v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();

    // ── 2. Peripheral bring-up ────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        error!("HAL init failed: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 3. Network bootstrap (fatal on failure) ───────────────
    let _wifi = WifiLink::connect(peripherals.modem, sysloop, nvs, &config)
        .context("WiFi bring-up failed")?;

    // ── 4. Domain core ────────────────────────────────────────
    let mac = device_id::read_mac();
    let client_id = device_id::client_id(&config.device_name, &mac);
    info!("client id: {client_id}");

    let mut hw = HardwareAdapter::new(
        SensorHub::on_board(),
        AlarmLed::new(),
        Buzzer::new(config.buzzer_duty_percent),
    );
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    let mut agent = Agent::new(config.clone(), client_id);

    // ── 5. Broker session (fatal on failure) ──────────────────
    let (events_tx, events_rx) = mpsc::channel();
    let will_topic = agent.will_topic();
    let mut link = MqttSession::connect(&config, agent.client_id(), &will_topic, events_tx)
        .context("broker connection error")?;
    agent.mark_connecting();

    // ── 6. Run loop ───────────────────────────────────────────
    //
    // Wake for whichever comes first: a session event, the nearest cadence
    // deadline, or the idle ceiling.
    let idle_ceiling_ms = u64::from(config.idle_wait_ceiling_secs) * 1000;
    loop {
        let now = clock.now_ms();
        let wait_ms = agent
            .next_deadline_ms(now)
            .unwrap_or(idle_ceiling_ms)
            .min(idle_ceiling_ms);

        match events_rx.recv_timeout(Duration::from_millis(wait_ms)) {
            Ok(event) => {
                agent.handle_session_event(clock.now_ms(), event, &mut hw, &mut link, &mut sink);
                // Drain whatever else arrived while we were blocked.
                while let Ok(event) = events_rx.try_recv() {
                    agent.handle_session_event(
                        clock.now_ms(),
                        event,
                        &mut hw,
                        &mut link,
                        &mut sink,
                    );
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        agent.tick(clock.now_ms(), &mut hw, &mut link, &mut sink);

        if agent.finished() {
            break;
        }
    }

    info!("session closed — exiting");
    Ok(())
}
