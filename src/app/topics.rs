//! Deterministic topic naming.
//!
//! Both publish and subscribe call sites go through [`Topics`], so the
//! strings they use are guaranteed identical (case-sensitive, no
//! normalization). With `unique_topic` enabled every logical name is
//! scoped by the client identity: `/<client_id><name>`.

use super::session::{ClientId, TopicString};

// Logical subtopic names. Outbound:
pub const TOPIC_PRESSURE: &str = "/pressure";
pub const TOPIC_GAS: &str = "/gas";
pub const TOPIC_UPTIME: &str = "/uptime";
pub const TOPIC_ONLINE: &str = "/online";
// Subscribed command topics (`/led` is also published as alarm state):
pub const TOPIC_LED: &str = "/led";
pub const TOPIC_PRINT: &str = "/print";
pub const TOPIC_PING: &str = "/ping";
pub const TOPIC_EXIT: &str = "/exit";

/// The four command topics subscribed on connect and unsubscribed on exit.
pub const COMMAND_TOPICS: [&str; 4] = [TOPIC_LED, TOPIC_PRINT, TOPIC_PING, TOPIC_EXIT];

/// Maps logical subtopic names to fully-qualified topic strings.
#[derive(Debug, Clone)]
pub struct Topics {
    client_id: ClientId,
    scoped: bool,
}

impl Topics {
    pub fn new(client_id: ClientId, scoped: bool) -> Self {
        Self { client_id, scoped }
    }

    /// Fully-qualified topic for a logical name, truncated to capacity.
    pub fn full(&self, name: &str) -> TopicString {
        let mut topic = TopicString::new();
        if self.scoped {
            let _ = topic.push('/');
            let _ = topic.push_str(self.client_id.as_str());
        }
        for ch in name.chars() {
            if topic.push(ch).is_err() {
                break;
            }
        }
        topic
    }

    /// Inverse of [`full`](Self::full) for the inbound path: strip the
    /// identity scope prefix, leaving the logical name. Topics that do not
    /// carry the prefix are returned unchanged.
    pub fn strip_scope<'a>(&self, topic: &'a str) -> &'a str {
        if !self.scoped {
            return topic;
        }
        topic
            .strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(self.client_id.as_str()))
            .unwrap_or(topic)
    }
}
