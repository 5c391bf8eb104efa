//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Agent (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, the broker session, event sinks)
//! implement these traits. The [`Agent`](super::agent::Agent) consumes them
//! via generics, so the domain core never touches hardware or the network
//! directly.

use crate::error::SessionError;

use super::session::{PayloadBuf, TopicString};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain normalized readings.
pub trait SensorPort {
    /// Pressure as a percentage of full scale (0–100).
    fn read_pressure_percent(&mut self) -> f32;

    /// Gas concentration as a percentage of full scale (0–100).
    fn read_gas_percent(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive the alarm LED.
    fn set_alarm_led(&mut self, on: bool);

    /// Drive the buzzer PWM (on = configured duty, off = silent).
    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Session port (driven adapter: domain → broker transport)
// ───────────────────────────────────────────────────────────────

/// The opaque broker session handle.
///
/// Every method initiates an asynchronous operation; settlement arrives
/// later as a [`SessionEvent`] fed to the agent. A synchronous `Err` means
/// the transport rejected the request outright and no settlement will
/// follow. QoS is fixed at-least-once inside the adapter.
pub trait SessionPort {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), SessionError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError>;

    fn unsubscribe(&mut self, topic: &str) -> Result<(), SessionError>;

    /// Begin a clean disconnect of the session.
    fn disconnect(&mut self) -> Result<(), SessionError>;
}

/// Asynchronous notifications from the session transport.
///
/// The transport adapter converts its native callback surface into these
/// owned events; the run loop feeds them to
/// [`Agent::handle_session_event`](super::agent::Agent::handle_session_event)
/// one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The broker accepted the connection (CONNACK).
    Connected,
    /// The transport lost or closed the connection.
    Disconnected,
    /// A subscribe request settled.
    Subscribed { ok: bool },
    /// An unsubscribe request settled.
    Unsubscribed { ok: bool },
    /// An outbound publish settled.
    Published { ok: bool },
    /// An inbound publish started; carries its (possibly truncated) topic.
    InboundBegin { topic: TopicString },
    /// Payload bytes of the inbound publish announced by `InboundBegin`.
    InboundData { payload: PayloadBuf },
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, a future
/// diagnostics topic, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
