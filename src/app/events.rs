//! Outbound application events.
//!
//! The [`Agent`](super::agent::Agent) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, mirror onto a diagnostics
//! topic, etc.

use super::commands::CommandKind;

/// Telemetry channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Pressure,
    Gas,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The broker accepted the session.
    ConnectionUp,
    /// The transport disconnected before the first accept.
    ConnectionFailed,
    /// The session closed after having been accepted.
    ConnectionClosed,
    /// The alarm actuator changed state (an actuator edge).
    AlarmChanged { on: bool },
    /// A reading passed the change gate and was published.
    TelemetryPublished { channel: Channel, value: f32 },
    /// A remote command was decoded and acted on.
    CommandReceived(CommandKind),
    /// The `exit` command started the graceful teardown.
    TeardownStarted,
}
