//! MQTT session adapter (ESP-IDF only).
//!
//! Implements [`SessionPort`] on top of `esp_idf_svc::mqtt::client::EspMqttClient`.
//! The ESP-IDF client delivers its events on an internal task; this adapter
//! converts each native event into an owned [`SessionEvent`] and forwards it
//! over an `mpsc` channel, so the [`Agent`](crate::app::agent::Agent) consumes
//! the whole session asynchronously from the main loop thread.
//!
//! QoS is fixed at-least-once for every publish and subscribe, matching the
//! delivery guarantee the telemetry contract assumes.

use std::sync::mpsc::Sender;
use std::time::Duration;

use esp_idf_svc::mqtt::client::{
    EspMqttClient, EventPayload, LwtConfiguration, MqttClientConfiguration, QoS,
};
use log::{debug, info, warn};

use crate::app::ports::{SessionEvent, SessionPort};
use crate::app::session::{PayloadBuf, TopicString};
use crate::config::SystemConfig;
use crate::error::{Error, SessionError};

/// Retained last-will payload announcing the device dropped off.
const WILL_PAYLOAD: &[u8] = b"0";

fn owned_topic(topic: &str) -> TopicString {
    let mut out = TopicString::new();
    for ch in topic.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

fn owned_payload(data: &[u8]) -> PayloadBuf {
    let mut out = PayloadBuf::new();
    let take = data.len().min(out.capacity());
    // Capacity checked above.
    let _ = out.extend_from_slice(&data[..take]);
    out
}

/// Broker session backed by the ESP-IDF MQTT client.
pub struct MqttSession {
    client: EspMqttClient<'static>,
    events: Sender<SessionEvent>,
    disconnect_requested: bool,
}

impl MqttSession {
    /// Create the client and start connecting to the configured broker.
    ///
    /// Connection progress arrives as [`SessionEvent`]s on `events`. A
    /// last-will of `"0"` (retained) is registered on `will_topic` so the
    /// broker announces an unclean drop-off.
    pub fn connect(
        config: &SystemConfig,
        client_id: &str,
        will_topic: &str,
        events: Sender<SessionEvent>,
    ) -> Result<Self, Error> {
        let mqtt_config = MqttClientConfiguration {
            client_id: Some(client_id),
            keep_alive_interval: Some(Duration::from_secs(u64::from(config.keep_alive_secs))),
            username: (!config.username.is_empty()).then_some(config.username.as_str()),
            password: (!config.password.is_empty()).then_some(config.password.as_str()),
            lwt: Some(LwtConfiguration {
                topic: will_topic,
                payload: WILL_PAYLOAD,
                qos: QoS::AtLeastOnce,
                retain: true,
            }),
            ..Default::default()
        };

        info!("MQTT: connecting to {} as '{client_id}'", config.broker_url);

        let callback_tx = events.clone();
        let client = EspMqttClient::new_cb(config.broker_url.as_str(), &mqtt_config, move |event| {
            for converted in convert(event.payload()) {
                // Receiver dropped means the main loop is gone; nothing to do.
                let _ = callback_tx.send(converted);
            }
        })
        .map_err(|e| {
            warn!("MQTT: client create failed ({e})");
            Error::Init("MQTT client create failed")
        })?;

        Ok(Self {
            client,
            events,
            disconnect_requested: false,
        })
    }
}

/// Convert a native ESP-IDF MQTT event into zero or more session events.
///
/// An inbound publish splits into `InboundBegin` (topic) followed by
/// `InboundData` (payload bytes), mirroring how the transport announces
/// large messages in chunks; continuation chunks carry no topic and map
/// to bare `InboundData`.
fn convert(payload: EventPayload<'_, esp_idf_svc::sys::EspError>) -> heapless::Vec<SessionEvent, 2> {
    let mut out = heapless::Vec::new();
    match payload {
        EventPayload::Connected(_session_present) => {
            let _ = out.push(SessionEvent::Connected);
        }
        EventPayload::Disconnected => {
            let _ = out.push(SessionEvent::Disconnected);
        }
        EventPayload::Subscribed(_id) => {
            let _ = out.push(SessionEvent::Subscribed { ok: true });
        }
        EventPayload::Unsubscribed(_id) => {
            let _ = out.push(SessionEvent::Unsubscribed { ok: true });
        }
        EventPayload::Published(_id) => {
            let _ = out.push(SessionEvent::Published { ok: true });
        }
        EventPayload::Received { topic, data, .. } => {
            if let Some(topic) = topic {
                let _ = out.push(SessionEvent::InboundBegin {
                    topic: owned_topic(topic),
                });
            }
            let _ = out.push(SessionEvent::InboundData {
                payload: owned_payload(data),
            });
        }
        EventPayload::Error(e) => {
            warn!("MQTT: transport error ({e})");
        }
        EventPayload::BeforeConnect => {}
        other => debug!("MQTT: unhandled transport event ({other:?})"),
    }
    out
}

impl SessionPort for MqttSession {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), SessionError> {
        self.client
            .enqueue(topic, QoS::AtLeastOnce, retain, payload)
            .map(|_id| ())
            .map_err(|_| SessionError::TransportRejected)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .map(|_id| ())
            .map_err(|_| SessionError::TransportRejected)
    }

    fn unsubscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        self.client
            .unsubscribe(topic)
            .map(|_id| ())
            .map_err(|_| SessionError::TransportRejected)
    }

    fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.disconnect_requested {
            return Ok(());
        }
        self.disconnect_requested = true;
        // The safe client API has no explicit DISCONNECT; dropping the
        // client closes the socket. Signal the agent so the main loop can
        // wind down and drop us.
        info!("MQTT: disconnect requested");
        self.events
            .send(SessionEvent::Disconnected)
            .map_err(|_| SessionError::NotConnected)
    }
}
