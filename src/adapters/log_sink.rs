//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future diagnostics-topic adapter would implement the same trait.

use log::info;

use crate::app::events::{AppEvent, Channel};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ConnectionUp => info!("SESSION | up"),
            AppEvent::ConnectionFailed => info!("SESSION | connect failed"),
            AppEvent::ConnectionClosed => info!("SESSION | closed"),
            AppEvent::AlarmChanged { on } => {
                info!("ALARM | {}", if *on { "On" } else { "Off" });
            }
            AppEvent::TelemetryPublished { channel, value } => {
                let name = match channel {
                    Channel::Pressure => "pressure",
                    Channel::Gas => "gas",
                };
                info!("TELEM | {name}={value:.2}%");
            }
            AppEvent::CommandReceived(kind) => info!("CMD | {kind:?}"),
            AppEvent::TeardownStarted => info!("SESSION | teardown started"),
        }
    }
}
