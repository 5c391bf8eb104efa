//! Inbound command decoding.
//!
//! Remote controllers publish to the four command topics; this module maps
//! an unscoped topic suffix plus raw payload bytes to a [`Command`]. The
//! protocol is deliberately forgiving: unrecognized alarm payloads and
//! unknown topic suffixes decode to [`Command::Ignored`] without error, so
//! the node tolerates forward/backward protocol skew.

use super::topics::{TOPIC_EXIT, TOPIC_LED, TOPIC_PING, TOPIC_PRINT};

/// A decoded remote command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Set the alarm actuator.
    Alarm(bool),
    /// Echo the payload to the diagnostic log.
    Print(&'a [u8]),
    /// Reply with uptime on the uptime topic.
    Ping,
    /// Begin the graceful teardown sequence.
    Exit,
    /// Unrecognized payload or unknown topic; dropped silently.
    Ignored,
}

/// Discriminant of a [`Command`], for event reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Alarm,
    Print,
    Ping,
    Exit,
    Ignored,
}

impl Command<'_> {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Alarm(_) => CommandKind::Alarm,
            Command::Print(_) => CommandKind::Print,
            Command::Ping => CommandKind::Ping,
            Command::Exit => CommandKind::Exit,
            Command::Ignored => CommandKind::Ignored,
        }
    }
}

/// Decode one inbound message. `suffix` is the topic with any identity
/// scope already stripped.
pub fn parse<'a>(suffix: &str, payload: &'a [u8]) -> Command<'a> {
    match suffix {
        TOPIC_LED => parse_alarm_payload(payload),
        TOPIC_PRINT => Command::Print(payload),
        TOPIC_PING => Command::Ping,
        TOPIC_EXIT => Command::Exit,
        _ => Command::Ignored,
    }
}

/// `on`/`off` match case-insensitively; `1`/`0` match exactly.
fn parse_alarm_payload(payload: &[u8]) -> Command<'static> {
    if payload.eq_ignore_ascii_case(b"on") || payload == b"1" {
        Command::Alarm(true)
    } else if payload.eq_ignore_ascii_case(b"off") || payload == b"0" {
        Command::Alarm(false)
    } else {
        Command::Ignored
    }
}
