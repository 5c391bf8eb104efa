//! The shared session record.
//!
//! [`DeviceSession`] is the single mutable state record of the whole node,
//! owned by [`Agent`](super::agent::Agent) and touched only on the one
//! logical run-loop thread — mutual exclusion is structural, not enforced
//! by locks.

/// Fixed capacity of a fully-qualified topic string.
pub const TOPIC_CAPACITY: usize = 96;
/// Declared maximum incoming message size; longer payloads are truncated.
pub const PAYLOAD_CAPACITY: usize = 256;

/// A bounded, heap-free topic string.
pub type TopicString = heapless::String<TOPIC_CAPACITY>;
/// A bounded inbound payload buffer.
pub type PayloadBuf = heapless::Vec<u8, PAYLOAD_CAPACITY>;
/// Client-id string (`airguard-xxyyzz`).
pub type ClientId = heapless::String<24>;

/// Broker connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// The single shared mutable record for the node.
///
/// Created once at process start with all fields at rest values and
/// destroyed only at process exit. `state` transitions are driven
/// exclusively by session events; `alarm_on` changes only through
/// [`Agent::set_alarm`](super::agent::Agent::set_alarm).
#[derive(Debug)]
pub struct DeviceSession {
    /// Immutable client identity, derived from the hardware-unique id.
    pub client_id: ClientId,
    pub state: ConnectionState,
    /// Net subscribe/unsubscribe settlements. +1 per subscribe settlement
    /// (failures included, to avoid teardown deadlock), −1 per unsubscribe
    /// settlement. Never observed negative once settled.
    pub pending_subscriptions: i32,
    /// Set by the remote `exit` command; never reset.
    pub stop_requested: bool,
    /// First CONNACK seen. A disconnect before this is a connection
    /// failure, not a teardown.
    pub accepted_once: bool,
    /// Last commanded alarm state.
    pub alarm_on: bool,
    /// Last gated pressure reading; `None` is the first-reading sentinel.
    pub last_published_pressure: Option<f32>,
    /// Last gated gas reading; `None` is the first-reading sentinel.
    pub last_published_gas: Option<f32>,
    /// Topic of the inbound publish currently being streamed in. Valid
    /// only between an InboundBegin and the matching InboundData.
    pub inbound_topic: TopicString,
}

impl DeviceSession {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            state: ConnectionState::Disconnected,
            pending_subscriptions: 0,
            stop_requested: false,
            accepted_once: false,
            alarm_on: false,
            last_published_pressure: None,
            last_published_gas: None,
            inbound_topic: TopicString::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// A subscribe request settled (successfully or not).
    pub fn note_subscribe_settled(&mut self) {
        self.pending_subscriptions += 1;
    }

    /// An unsubscribe request settled. Returns `true` when the graceful
    /// teardown should now issue the disconnect.
    pub fn note_unsubscribe_settled(&mut self) -> bool {
        self.pending_subscriptions -= 1;
        self.stop_requested && self.pending_subscriptions <= 0
    }

    /// Record the topic of an inbound publish, truncated to capacity.
    pub fn begin_inbound(&mut self, topic: &str) {
        self.inbound_topic.clear();
        for ch in topic.chars() {
            if self.inbound_topic.push(ch).is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DeviceSession {
        let mut id = ClientId::new();
        id.push_str("airguard-efcafe").unwrap();
        DeviceSession::new(id)
    }

    #[test]
    fn balance_is_net_of_settlements() {
        let mut s = session();
        for _ in 0..4 {
            s.note_subscribe_settled();
        }
        assert_eq!(s.pending_subscriptions, 4);
        for _ in 0..3 {
            assert!(!s.note_unsubscribe_settled());
        }
        assert_eq!(s.pending_subscriptions, 1);
    }

    #[test]
    fn teardown_requires_stop_and_zero_balance() {
        let mut s = session();
        s.note_subscribe_settled();
        s.note_subscribe_settled();

        // Balance reaches zero without a stop request: no disconnect.
        assert!(!s.note_unsubscribe_settled());
        assert!(!s.note_unsubscribe_settled());
        assert_eq!(s.pending_subscriptions, 0);

        s.note_subscribe_settled();
        s.stop_requested = true;
        // Stop requested but one subscription still pending.
        assert_eq!(s.pending_subscriptions, 1);
        assert!(s.note_unsubscribe_settled());
    }

    #[test]
    fn inbound_topic_truncates_at_capacity() {
        let mut s = session();
        let long = "x".repeat(TOPIC_CAPACITY + 50);
        s.begin_inbound(&long);
        assert_eq!(s.inbound_topic.len(), TOPIC_CAPACITY);
    }

    #[test]
    fn begin_inbound_replaces_previous_topic() {
        let mut s = session();
        s.begin_inbound("/led");
        s.begin_inbound("/ping");
        assert_eq!(s.inbound_topic.as_str(), "/ping");
    }
}
