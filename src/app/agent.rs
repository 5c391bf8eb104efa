//! The session/command/actuation coordinator.
//!
//! [`Agent`] owns the [`DeviceSession`] record and drives everything that
//! happens after boot: reacting to session events from the transport,
//! sampling sensors on the telemetry cadence, gating publishes, and keeping
//! the alarm actuators consistent whether an edge comes from a threshold
//! crossing or a remote command.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │         Agent           │
//! ActuatorPort ◀──│ session · gating · alarm│──▶ SessionPort
//!                 └────────────▲───────────┘
//!                       SessionEvent (from transport)
//! ```
//!
//! All methods run on the single logical run-loop thread; no callback ever
//! executes concurrently with another, so the session record needs no lock.

use core::fmt::Write as _;

use log::{debug, error, info};

use crate::config::SystemConfig;
use crate::error::SessionError;
use crate::scheduler::Cadence;

use super::commands::{self, Command};
use super::events::{AppEvent, Channel};
use super::ports::{ActuatorPort, EventSink, SensorPort, SessionEvent, SessionPort};
use super::session::{ClientId, ConnectionState, DeviceSession, TopicString};
use super::topics::{
    COMMAND_TOPICS, TOPIC_GAS, TOPIC_LED, TOPIC_ONLINE, TOPIC_PRESSURE, TOPIC_UPTIME, Topics,
};

/// Coordinates session lifecycle, telemetry and actuation.
pub struct Agent {
    session: DeviceSession,
    topics: Topics,
    config: SystemConfig,
    /// Telemetry sampling cadence; armed on CONNACK.
    telemetry: Cadence,
    /// Buzzer toggle cadence; armed only while the alarm is on.
    pulse: Cadence,
    /// Current phase of the free-running buzzer pulse.
    buzzer_sounding: bool,
}

impl Agent {
    pub fn new(config: SystemConfig, client_id: ClientId) -> Self {
        let topics = Topics::new(client_id.clone(), config.unique_topic);
        let telemetry = Cadence::new(u64::from(config.telemetry_interval_secs) * 1000);
        let pulse = Cadence::new(u64::from(config.buzzer_interval_ms));
        Self {
            session: DeviceSession::new(client_id),
            topics,
            config,
            telemetry,
            pulse,
            buzzer_sounding: false,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn client_id(&self) -> &str {
        self.session.client_id.as_str()
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state
    }

    pub fn alarm_on(&self) -> bool {
        self.session.alarm_on
    }

    pub fn pending_subscriptions(&self) -> i32 {
        self.session.pending_subscriptions
    }

    pub fn stop_requested(&self) -> bool {
        self.session.stop_requested
    }

    /// Fully-qualified liveness topic, used as the connect-time will topic.
    pub fn will_topic(&self) -> TopicString {
        self.topics.full(TOPIC_ONLINE)
    }

    /// The process may return: the session was accepted at least once and
    /// has since fully disconnected.
    pub fn finished(&self) -> bool {
        self.session.accepted_once && self.session.state == ConnectionState::Disconnected
    }

    /// Milliseconds until the next scheduled cadence fire, if any.
    /// The run loop shortens its idle wait to this.
    pub fn next_deadline_ms(&self, now_ms: u64) -> Option<u64> {
        let t = self.telemetry.until_due_ms(now_ms);
        let p = self.pulse.until_due_ms(now_ms);
        match (t, p) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (deadline, None) | (None, deadline) => deadline,
        }
    }

    /// Record that the connect request is in flight.
    pub fn mark_connecting(&mut self) {
        self.session.state = ConnectionState::Connecting;
    }

    // ── Session event handling ────────────────────────────────

    /// Process one asynchronous notification from the session transport.
    pub fn handle_session_event(
        &mut self,
        now_ms: u64,
        event: SessionEvent,
        hw: &mut impl ActuatorPort,
        link: &mut impl SessionPort,
        sink: &mut impl EventSink,
    ) {
        match event {
            SessionEvent::Connected => self.on_connected(now_ms, hw, link, sink),
            SessionEvent::Disconnected => self.on_disconnected(sink),
            SessionEvent::Subscribed { ok } => {
                if !ok {
                    error!("subscribe request failed");
                }
                // Failed settlements still count, or teardown would wait
                // forever for an unsubscribe that can never balance out.
                self.session.note_subscribe_settled();
            }
            SessionEvent::Unsubscribed { ok } => {
                if !ok {
                    error!("unsubscribe request failed");
                }
                if self.session.note_unsubscribe_settled() {
                    info!("all command topics released, disconnecting");
                    if let Err(e) = link.disconnect() {
                        error!("disconnect failed: {e}");
                    }
                    self.session.state = ConnectionState::Disconnecting;
                }
            }
            SessionEvent::Published { ok } => {
                if ok {
                    debug!("publish acknowledged");
                } else {
                    error!("publish failed");
                }
            }
            SessionEvent::InboundBegin { topic } => self.session.begin_inbound(topic.as_str()),
            SessionEvent::InboundData { payload } => {
                self.on_inbound(now_ms, &payload, hw, link, sink);
            }
        }
    }

    fn on_connected(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        link: &mut impl SessionPort,
        sink: &mut impl EventSink,
    ) {
        self.session.state = ConnectionState::Connected;
        self.session.accepted_once = true;
        info!("connected to broker as {}", self.client_id());
        sink.emit(&AppEvent::ConnectionUp);

        // Clear any retained alarm state surviving a reconnect.
        if let Err(e) = self.publish(link, TOPIC_LED, b"", true) {
            error!("failed to clear retained alarm state: {e}");
        }

        for name in COMMAND_TOPICS {
            let topic = self.topics.full(name);
            if let Err(e) = link.subscribe(topic.as_str()) {
                error!("subscribe to {topic} failed: {e}");
            }
        }

        // Liveness marker; the connect-time will delivers "0" on an
        // abnormal disconnect.
        if let Err(e) = self.publish(link, TOPIC_ONLINE, b"1", true) {
            error!("failed to publish liveness marker: {e}");
        }

        self.telemetry.arm_now(now_ms);
        // Known-off actuator baseline after a (re)connect.
        self.set_alarm(now_ms, false, hw, link, sink);
    }

    fn on_disconnected(&mut self, sink: &mut impl EventSink) {
        self.session.state = ConnectionState::Disconnected;
        self.telemetry.disarm();
        if self.session.accepted_once {
            info!("session closed");
            sink.emit(&AppEvent::ConnectionClosed);
        } else {
            error!("failed to connect to broker");
            sink.emit(&AppEvent::ConnectionFailed);
        }
    }

    fn on_inbound(
        &mut self,
        now_ms: u64,
        payload: &[u8],
        hw: &mut impl ActuatorPort,
        link: &mut impl SessionPort,
        sink: &mut impl EventSink,
    ) {
        let topic = self.session.inbound_topic.clone();
        let suffix = self.topics.strip_scope(topic.as_str());
        debug!("inbound: topic={topic} len={}", payload.len());

        let cmd = commands::parse(suffix, payload);
        if cmd != Command::Ignored {
            sink.emit(&AppEvent::CommandReceived(cmd.kind()));
        }
        match cmd {
            Command::Alarm(on) => self.set_alarm(now_ms, on, hw, link, sink),
            Command::Print(text) => {
                info!("{}", String::from_utf8_lossy(text));
            }
            Command::Ping => {
                // Only answered while connected; otherwise dropped silently.
                if self.session.is_connected() {
                    let mut uptime = heapless::String::<12>::new();
                    let _ = write!(uptime, "{}", now_ms / 1000);
                    if let Err(e) = self.publish(link, TOPIC_UPTIME, uptime.as_bytes(), false) {
                        error!("cannot publish uptime: {e}");
                    }
                }
            }
            Command::Exit => {
                info!("exit requested, releasing command topics");
                sink.emit(&AppEvent::TeardownStarted);
                self.session.stop_requested = true;
                for name in COMMAND_TOPICS {
                    let topic = self.topics.full(name);
                    if let Err(e) = link.unsubscribe(topic.as_str()) {
                        error!("unsubscribe from {topic} failed: {e}");
                    }
                }
            }
            Command::Ignored => {} // silent, by protocol design
        }
    }

    // ── Cadence handling ──────────────────────────────────────

    /// Fire any due cadences. Called once per run-loop iteration.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        link: &mut impl SessionPort,
        sink: &mut impl EventSink,
    ) {
        if self.telemetry.fire_due(now_ms) {
            self.telemetry_tick(now_ms, hw, link, sink);
        }
        if self.session.alarm_on && self.pulse.fire_due(now_ms) {
            self.buzzer_sounding = !self.buzzer_sounding;
            hw.set_buzzer(self.buzzer_sounding);
            debug!("buzzer {}", if self.buzzer_sounding { "on" } else { "off" });
        }
    }

    /// One telemetry cycle: sample both channels, evaluate actuation on the
    /// combined snapshot, then change-gate the publishes.
    fn telemetry_tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        link: &mut impl SessionPort,
        sink: &mut impl EventSink,
    ) {
        let pressure = hw.read_pressure_percent();
        let gas = hw.read_gas_percent();

        // Actuation is a function of both quantities, not just the one
        // being published: either threshold alone trips the alarm.
        let alarm = pressure > self.config.pressure_alarm_percent
            || gas > self.config.gas_alarm_percent;
        self.set_alarm(now_ms, alarm, hw, link, sink);

        self.publish_gated(Channel::Pressure, pressure, link, sink);
        self.publish_gated(Channel::Gas, gas, link, sink);

        // Alarm-state heartbeat: goes out every tick regardless of gating.
        let state: &[u8] = if self.session.alarm_on { b"On" } else { b"Off" };
        if let Err(e) = self.publish(link, TOPIC_LED, state, false) {
            error!("cannot publish alarm state: {e}");
        }
    }

    /// Publish a reading iff it moved more than the configured delta since
    /// the last gated value, or no reading has ever been published.
    fn publish_gated(
        &mut self,
        channel: Channel,
        value: f32,
        link: &mut impl SessionPort,
        sink: &mut impl EventSink,
    ) {
        let (last, name) = match channel {
            Channel::Pressure => (self.session.last_published_pressure, TOPIC_PRESSURE),
            Channel::Gas => (self.session.last_published_gas, TOPIC_GAS),
        };
        let passes = last.is_none_or(|old| (value - old).abs() > self.config.publish_delta_percent);
        if !passes {
            return;
        }
        match channel {
            Channel::Pressure => self.session.last_published_pressure = Some(value),
            Channel::Gas => self.session.last_published_gas = Some(value),
        }

        let mut payload = heapless::String::<16>::new();
        let _ = write!(payload, "{value:.2}");
        match self.publish(link, name, payload.as_bytes(), false) {
            Ok(()) => {
                info!("publishing {payload} to {name}");
                sink.emit(&AppEvent::TelemetryPublished { channel, value });
            }
            Err(e) => error!("cannot publish to {name}: {e}"),
        }
    }

    // ── Actuation mutation point ──────────────────────────────

    /// The single mutation point for the alarm actuators, shared by the
    /// telemetry path and the remote command path.
    ///
    /// Idempotent: repeating the current state changes nothing and
    /// publishes nothing. An actual edge drives the LED, resets the buzzer
    /// pulse, and announces the new state on the alarm topic.
    pub fn set_alarm(
        &mut self,
        now_ms: u64,
        on: bool,
        hw: &mut impl ActuatorPort,
        link: &mut impl SessionPort,
        sink: &mut impl EventSink,
    ) {
        if self.session.alarm_on == on {
            return;
        }
        self.session.alarm_on = on;
        hw.set_alarm_led(on);
        if on {
            // First pulse boundary exactly one interval away.
            self.buzzer_sounding = false;
            self.pulse.arm_after_period(now_ms);
        } else {
            hw.set_buzzer(false);
            self.buzzer_sounding = false;
            self.pulse.disarm();
        }
        info!("alarm {}", if on { "On" } else { "Off" });
        sink.emit(&AppEvent::AlarmChanged { on });

        let state: &[u8] = if on { b"On" } else { b"Off" };
        if let Err(e) = self.publish(link, TOPIC_LED, state, false) {
            error!("cannot publish alarm state: {e}");
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Publish through the topic namer, refusing while not connected.
    fn publish(
        &self,
        link: &mut impl SessionPort,
        name: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), SessionError> {
        if !self.session.is_connected() {
            return Err(SessionError::NotConnected);
        }
        let topic = self.topics.full(name);
        link.publish(topic.as_str(), payload, retain)
    }
}
