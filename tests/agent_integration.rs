//! Integration tests: Agent → session events → actuators and publishes.
//!
//! Drives the agent through recorded mock ports, the same way the run loop
//! does on target, and asserts on the externally visible effects: actuator
//! calls, outbound publishes, and emitted events.

use airguard::app::agent::Agent;
use airguard::app::events::AppEvent;
use airguard::app::ports::{ActuatorPort, EventSink, SensorPort, SessionEvent, SessionPort};
use airguard::app::session::{ClientId, ConnectionState, PayloadBuf, TopicString};
use airguard::config::SystemConfig;
use airguard::error::SessionError;

// ── Mock implementations ──────────────────────────────────────

struct MockHw {
    pressure: f32,
    gas: f32,
    led_calls: Vec<bool>,
    buzzer_calls: Vec<bool>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            pressure: 10.0,
            gas: 10.0,
            led_calls: Vec::new(),
            buzzer_calls: Vec::new(),
        }
    }
}

impl SensorPort for MockHw {
    fn read_pressure_percent(&mut self) -> f32 {
        self.pressure
    }
    fn read_gas_percent(&mut self) -> f32 {
        self.gas
    }
}

impl ActuatorPort for MockHw {
    fn set_alarm_led(&mut self, on: bool) {
        self.led_calls.push(on);
    }
    fn set_buzzer(&mut self, on: bool) {
        self.buzzer_calls.push(on);
    }
}

#[derive(Default)]
struct MockLink {
    publishes: Vec<(String, Vec<u8>, bool)>,
    subscribes: Vec<String>,
    unsubscribes: Vec<String>,
    disconnects: u32,
    reject_publish: bool,
}

impl MockLink {
    fn new() -> Self {
        Self::default()
    }

    /// Payloads published to a given topic, in order.
    fn payloads_for(&self, topic: &str) -> Vec<&[u8]> {
        self.publishes
            .iter()
            .filter(|(t, _, _)| t == topic)
            .map(|(_, p, _)| p.as_slice())
            .collect()
    }
}

impl SessionPort for MockLink {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), SessionError> {
        if self.reject_publish {
            return Err(SessionError::TransportRejected);
        }
        self.publishes
            .push((topic.to_string(), payload.to_vec(), retain));
        Ok(())
    }
    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        self.subscribes.push(topic.to_string());
        Ok(())
    }
    fn unsubscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        self.unsubscribes.push(topic.to_string());
        Ok(())
    }
    fn disconnect(&mut self) -> Result<(), SessionError> {
        self.disconnects += 1;
        Ok(())
    }
}

struct VecSink {
    events: Vec<AppEvent>,
}

impl VecSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, e: &AppEvent) {
        self.events.push(e.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

fn make_agent() -> Agent {
    let mut id = ClientId::new();
    id.push_str("airguard-efcafe").unwrap();
    Agent::new(SystemConfig::default(), id)
}

fn connect(agent: &mut Agent, hw: &mut MockHw, link: &mut MockLink, sink: &mut VecSink, now: u64) {
    agent.mark_connecting();
    agent.handle_session_event(now, SessionEvent::Connected, hw, link, sink);
}

/// Feed one inbound publish through the two-phase transport surface.
fn inbound(
    agent: &mut Agent,
    now: u64,
    topic: &str,
    payload: &[u8],
    hw: &mut MockHw,
    link: &mut MockLink,
    sink: &mut VecSink,
) {
    let topic = TopicString::try_from(topic).unwrap();
    let payload = PayloadBuf::from_slice(payload).unwrap();
    agent.handle_session_event(now, SessionEvent::InboundBegin { topic }, hw, link, sink);
    agent.handle_session_event(now, SessionEvent::InboundData { payload }, hw, link, sink);
}

// ── Connect sequence ──────────────────────────────────────────

#[test]
fn connect_clears_retained_state_subscribes_and_announces() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    assert_eq!(agent.state(), ConnectionState::Connected);
    assert_eq!(
        link.subscribes,
        vec!["/led", "/print", "/ping", "/exit"],
        "all four command topics subscribed in order"
    );
    // Retained alarm residue cleared before anything else goes out.
    assert_eq!(
        link.publishes[0],
        ("/led".to_string(), b"".to_vec(), true)
    );
    // Liveness marker is retained so late observers see it.
    assert!(
        link.publishes
            .contains(&("/online".to_string(), b"1".to_vec(), true))
    );
    assert!(sink.events.contains(&AppEvent::ConnectionUp));
}

#[test]
fn disconnect_before_connack_is_a_failure_not_a_teardown() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    agent.mark_connecting();
    agent.handle_session_event(0, SessionEvent::Disconnected, &mut hw, &mut link, &mut sink);

    assert!(sink.events.contains(&AppEvent::ConnectionFailed));
    assert!(!agent.finished(), "never accepted, so never finished");
}

// ── Telemetry cadence and change gating ───────────────────────

#[test]
fn first_readings_always_publish() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    agent.tick(0, &mut hw, &mut link, &mut sink);
    assert_eq!(link.payloads_for("/pressure"), vec![b"10.00" as &[u8]]);
    assert_eq!(link.payloads_for("/gas"), vec![b"10.00" as &[u8]]);
}

#[test]
fn unchanged_readings_are_gated_but_heartbeat_still_goes_out() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    agent.tick(0, &mut hw, &mut link, &mut sink);
    let leds_before = link.payloads_for("/led").len();
    agent.tick(2000, &mut hw, &mut link, &mut sink);

    assert_eq!(
        link.payloads_for("/pressure").len(),
        1,
        "identical reading must not republish"
    );
    assert_eq!(
        link.payloads_for("/led").len(),
        leds_before + 1,
        "alarm-state heartbeat is not gated"
    );
}

#[test]
fn gate_opens_only_past_the_delta() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    agent.tick(0, &mut hw, &mut link, &mut sink); // publishes 10.00

    hw.pressure = 10.05; // within ±0.1 of the last published 10.0
    agent.tick(2000, &mut hw, &mut link, &mut sink);
    assert_eq!(link.payloads_for("/pressure").len(), 1);

    hw.pressure = 10.2; // 0.2 away from the gate reference
    agent.tick(4000, &mut hw, &mut link, &mut sink);
    assert_eq!(
        link.payloads_for("/pressure"),
        vec![b"10.00" as &[u8], b"10.20"]
    );
}

#[test]
fn gate_reference_survives_reconnect() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);
    agent.tick(0, &mut hw, &mut link, &mut sink);

    agent.handle_session_event(100, SessionEvent::Disconnected, &mut hw, &mut link, &mut sink);
    agent.handle_session_event(200, SessionEvent::Connected, &mut hw, &mut link, &mut sink);

    agent.tick(200, &mut hw, &mut link, &mut sink);
    assert_eq!(
        link.payloads_for("/pressure").len(),
        1,
        "unchanged reading stays gated across a reconnect"
    );
}

#[test]
fn cadence_does_not_run_while_disconnected() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);
    agent.handle_session_event(10, SessionEvent::Disconnected, &mut hw, &mut link, &mut sink);

    let published_before = link.publishes.len();
    agent.tick(5000, &mut hw, &mut link, &mut sink);
    assert_eq!(link.publishes.len(), published_before);
    assert_eq!(agent.next_deadline_ms(5000), None);
}

// ── Alarm thresholds ──────────────────────────────────────────

#[test]
fn either_threshold_alone_trips_the_alarm() {
    for (pressure, gas, expect_on) in [(65.0, 10.0, true), (10.0, 55.0, true), (10.0, 10.0, false)]
    {
        let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
        let mut agent = make_agent();
        connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

        hw.pressure = pressure;
        hw.gas = gas;
        agent.tick(0, &mut hw, &mut link, &mut sink);

        assert_eq!(
            agent.alarm_on(),
            expect_on,
            "pressure={pressure} gas={gas}"
        );
        if expect_on {
            assert_eq!(hw.led_calls, vec![true]);
            assert!(sink.events.contains(&AppEvent::AlarmChanged { on: true }));
        }
    }
}

#[test]
fn alarm_clears_when_both_fall_below_thresholds() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    hw.pressure = 90.0;
    agent.tick(0, &mut hw, &mut link, &mut sink);
    assert!(agent.alarm_on());

    hw.pressure = 10.0;
    agent.tick(2000, &mut hw, &mut link, &mut sink);
    assert!(!agent.alarm_on());
    assert_eq!(hw.led_calls, vec![true, false]);
    // Turning the alarm off silences the buzzer immediately.
    assert_eq!(hw.buzzer_calls.last(), Some(&false));
}

#[test]
fn buzzer_toggles_on_the_pulse_cadence_while_alarm_on() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    hw.pressure = 90.0;
    agent.tick(0, &mut hw, &mut link, &mut sink); // alarm on, pulse armed

    agent.tick(400, &mut hw, &mut link, &mut sink); // before first boundary
    assert!(hw.buzzer_calls.is_empty());

    agent.tick(500, &mut hw, &mut link, &mut sink);
    assert_eq!(hw.buzzer_calls, vec![true]);

    agent.tick(1000, &mut hw, &mut link, &mut sink);
    assert_eq!(hw.buzzer_calls, vec![true, false]);
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn alarm_command_is_case_insensitive_end_to_end() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    inbound(&mut agent, 100, "/led", b"ON", &mut hw, &mut link, &mut sink);
    assert!(agent.alarm_on());

    inbound(&mut agent, 200, "/led", b"oFf", &mut hw, &mut link, &mut sink);
    assert!(!agent.alarm_on());
    assert_eq!(hw.led_calls, vec![true, false]);
}

#[test]
fn repeated_alarm_command_is_idempotent() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    inbound(&mut agent, 100, "/led", b"on", &mut hw, &mut link, &mut sink);
    inbound(&mut agent, 200, "/led", b"on", &mut hw, &mut link, &mut sink);

    assert_eq!(hw.led_calls, vec![true], "no second actuator write");
    assert_eq!(
        link.payloads_for("/led")
            .iter()
            .filter(|p| **p == b"On")
            .count(),
        1,
        "state announced at most once per edge"
    );
    let alarm_events = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::AlarmChanged { .. }))
        .count();
    assert_eq!(alarm_events, 1);
}

#[test]
fn garbage_alarm_payload_is_silently_ignored() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    let published_before = link.publishes.len();
    inbound(&mut agent, 100, "/led", b"banana", &mut hw, &mut link, &mut sink);

    assert!(!agent.alarm_on());
    assert!(hw.led_calls.is_empty());
    assert_eq!(link.publishes.len(), published_before);
    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::CommandReceived(_))),
        "ignored messages emit no command event"
    );
}

#[test]
fn ping_replies_with_uptime_seconds() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    inbound(&mut agent, 5000, "/ping", b"", &mut hw, &mut link, &mut sink);
    assert_eq!(link.payloads_for("/uptime"), vec![b"5" as &[u8]]);
}

#[test]
fn ping_is_dropped_while_disconnected() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();

    inbound(&mut agent, 5000, "/ping", b"", &mut hw, &mut link, &mut sink);
    assert!(link.publishes.is_empty());
}

// ── Subscription balance and graceful teardown ────────────────

#[test]
fn failed_subscribe_settlements_still_count() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    agent.handle_session_event(1, SessionEvent::Subscribed { ok: true }, &mut hw, &mut link, &mut sink);
    agent.handle_session_event(2, SessionEvent::Subscribed { ok: false }, &mut hw, &mut link, &mut sink);
    assert_eq!(agent.pending_subscriptions(), 2);
}

#[test]
fn exit_unsubscribes_all_and_disconnects_on_balance_zero() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);
    for i in 0..4 {
        agent.handle_session_event(i, SessionEvent::Subscribed { ok: true }, &mut hw, &mut link, &mut sink);
    }

    inbound(&mut agent, 1000, "/exit", b"", &mut hw, &mut link, &mut sink);
    assert!(agent.stop_requested());
    assert_eq!(link.unsubscribes, vec!["/led", "/print", "/ping", "/exit"]);
    assert!(sink.events.contains(&AppEvent::TeardownStarted));

    for i in 0..4 {
        assert_eq!(link.disconnects, 0, "no disconnect before balance zero");
        agent.handle_session_event(
            2000 + i,
            SessionEvent::Unsubscribed { ok: true },
            &mut hw,
            &mut link,
            &mut sink,
        );
    }
    assert_eq!(link.disconnects, 1);
    assert_eq!(agent.state(), ConnectionState::Disconnecting);

    agent.handle_session_event(3000, SessionEvent::Disconnected, &mut hw, &mut link, &mut sink);
    assert!(agent.finished());
    assert!(sink.events.contains(&AppEvent::ConnectionClosed));
}

#[test]
fn balance_zero_without_stop_request_does_not_disconnect() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    agent.handle_session_event(1, SessionEvent::Subscribed { ok: true }, &mut hw, &mut link, &mut sink);
    agent.handle_session_event(2, SessionEvent::Unsubscribed { ok: true }, &mut hw, &mut link, &mut sink);
    assert_eq!(link.disconnects, 0);
}

// ── Transport failure tolerance ───────────────────────────────

#[test]
fn rejected_publishes_do_not_panic_or_emit_telemetry() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);

    link.reject_publish = true;
    agent.tick(0, &mut hw, &mut link, &mut sink);
    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::TelemetryPublished { .. })),
        "rejected publishes must not be reported as sent"
    );
}

// ── Full scenario ─────────────────────────────────────────────

#[test]
fn full_session_lifecycle() {
    let (mut hw, mut link, mut sink) = (MockHw::new(), MockLink::new(), VecSink::new());
    let mut agent = make_agent();

    // Boot → connect.
    connect(&mut agent, &mut hw, &mut link, &mut sink, 0);
    for i in 0..4 {
        agent.handle_session_event(i, SessionEvent::Subscribed { ok: true }, &mut hw, &mut link, &mut sink);
    }

    // Quiet telemetry.
    agent.tick(0, &mut hw, &mut link, &mut sink);
    assert!(!agent.alarm_on());

    // Operator forces the alarm on, the buzzer starts pulsing.
    inbound(&mut agent, 100, "/led", b"on", &mut hw, &mut link, &mut sink);
    agent.tick(600, &mut hw, &mut link, &mut sink);
    assert_eq!(hw.buzzer_calls, vec![true]);

    // Next telemetry cycle re-evaluates the quiet sensors and clears it.
    agent.tick(2000, &mut hw, &mut link, &mut sink);
    assert!(!agent.alarm_on());
    assert_eq!(hw.buzzer_calls.last(), Some(&false));

    // Remote exit → graceful teardown.
    inbound(&mut agent, 2100, "/exit", b"", &mut hw, &mut link, &mut sink);
    for i in 0..4 {
        agent.handle_session_event(
            2200 + i,
            SessionEvent::Unsubscribed { ok: true },
            &mut hw,
            &mut link,
            &mut sink,
        );
    }
    agent.handle_session_event(2300, SessionEvent::Disconnected, &mut hw, &mut link, &mut sink);
    assert!(agent.finished());
}
