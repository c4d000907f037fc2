//! Mock adapters for integration tests.
//!
//! Records every dot write, radio call, and broker call so tests can
//! assert on the full history without touching real GPIO/PWM registers
//! or the network.

use std::collections::VecDeque;

use braillecell::app::events::AppEvent;
use braillecell::app::main_loop::MainLoop;
use braillecell::app::messaging::InboundMessage;
use braillecell::app::ports::{
    DotOutput, EntropySource, EventSink, RadioStatus, Refusal, SessionParams, SessionTransport,
    TransportEvent, WifiPort,
};
use braillecell::braille::{DOT_COUNT, DotState};
use braillecell::config::DeviceConfig;
use embedded_hal::delay::DelayNs;

// ── Dot output ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotWrite {
    pub index: usize,
    pub state: DotState,
}

#[derive(Default)]
pub struct RecordingOutput {
    pub writes: Vec<DotWrite>,
}

#[allow(dead_code)]
impl RecordingOutput {
    /// Physical state reconstructed from the write history.
    pub fn physical(&self) -> [DotState; DOT_COUNT] {
        let mut bank = [DotState::Lowered; DOT_COUNT];
        for w in &self.writes {
            bank[w.index] = w.state;
        }
        bank
    }

    pub fn raised_dots(&self) -> Vec<usize> {
        self.physical()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_raised())
            .map(|(i, _)| i + 1)
            .collect()
    }
}

impl DotOutput for RecordingOutput {
    fn set_dot(&mut self, index: usize, state: DotState) {
        self.writes.push(DotWrite { index, state });
    }
}

// ── Radio ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RadioCall {
    Disconnect,
    Begin { ssid: String, password: String },
}

pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    /// Statuses returned first, one per `status()` call.
    pub script: VecDeque<RadioStatus>,
    /// Returned once the script runs out.
    pub steady: RadioStatus,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn connecting() -> Self {
        Self {
            calls: Vec::new(),
            script: VecDeque::new(),
            steady: RadioStatus::Connected,
        }
    }

    pub fn stuck(status: RadioStatus) -> Self {
        Self {
            calls: Vec::new(),
            script: VecDeque::new(),
            steady: status,
        }
    }

    pub fn begins(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RadioCall::Begin { .. }))
            .count()
    }
}

impl WifiPort for MockRadio {
    fn disconnect(&mut self) {
        self.calls.push(RadioCall::Disconnect);
    }

    fn begin(&mut self, ssid: &str, password: &str) {
        self.calls.push(RadioCall::Begin {
            ssid: ssid.into(),
            password: password.into(),
        });
    }

    fn status(&mut self) -> RadioStatus {
        self.script.pop_front().unwrap_or(self.steady)
    }

    fn rssi(&self) -> Option<i8> {
        Some(-61)
    }
}

// ── Broker ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerCall {
    Open {
        client_id: String,
        username: Option<String>,
        keepalive_secs: u16,
        socket_timeout_secs: u16,
    },
    Subscribe(String),
    Close,
}

#[derive(Default)]
pub struct MockBroker {
    pub calls: Vec<BrokerCall>,
    /// Results for upcoming `open()` calls; `Ok` once exhausted.
    pub open_results: VecDeque<Result<(), Refusal>>,
    pub pending: VecDeque<TransportEvent>,
    pub open: bool,
    /// Number of `poll()` calls so far.
    pub polls: usize,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn publish(&mut self, topic: &str, payload: &[u8]) {
        self.pending
            .push_back(TransportEvent::Message(InboundMessage::new(topic, payload)));
    }

    pub fn drop_session(&mut self) {
        self.open = false;
        self.pending.push_back(TransportEvent::Closed);
    }

    pub fn client_ids(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BrokerCall::Open { client_id, .. } => Some(client_id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl SessionTransport for MockBroker {
    fn open(&mut self, params: &SessionParams<'_>) -> Result<(), Refusal> {
        self.calls.push(BrokerCall::Open {
            client_id: params.client_id.into(),
            username: params.username.map(Into::into),
            keepalive_secs: params.keepalive_secs,
            socket_timeout_secs: params.socket_timeout_secs,
        });
        let result = self.open_results.pop_front().unwrap_or(Ok(()));
        self.open = result.is_ok();
        result
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Refusal> {
        self.calls.push(BrokerCall::Subscribe(topic.into()));
        Ok(())
    }

    fn poll(&mut self) -> TransportEvent {
        self.polls += 1;
        self.pending.pop_front().unwrap_or(TransportEvent::Idle)
    }

    fn close(&mut self) {
        self.open = false;
        self.calls.push(BrokerCall::Close);
    }
}

// ── Entropy ───────────────────────────────────────────────────

/// Returns 0xBEE0, 0xBEE1, ... so client ids are predictable.
pub struct SequenceEntropy(pub u32);

impl EntropySource for SequenceEntropy {
    fn next_u32(&mut self) -> u32 {
        let v = 0xBEE0 + self.0;
        self.0 += 1;
        v
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Virtual clock: accumulates requested delays instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub ns: u64,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn ms(&self) -> u64 {
        self.ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += u64::from(ns);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
    pub lines: Vec<String>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.lines.push(format!("{:?}", event));
        self.events.push(event.clone());
    }
}

// ── Assembled loop ────────────────────────────────────────────

pub type MockLoop =
    MainLoop<MockRadio, MockBroker, SequenceEntropy, RecordingOutput, MockDelay, LogSink>;

pub fn test_config() -> DeviceConfig {
    DeviceConfig::from_json(
        br#"{
            "wifi": { "ssid": "HomeWiFi", "password": "mysecret8" },
            "broker": { "host": "broker.example.net" }
        }"#,
    )
    .expect("test config parses")
}

#[allow(dead_code)]
pub fn mock_loop(radio: MockRadio, broker: MockBroker) -> MockLoop {
    MainLoop::new(
        &test_config(),
        radio,
        broker,
        SequenceEntropy(0),
        RecordingOutput::default(),
        MockDelay::default(),
        LogSink::new(),
    )
}

/// Tick until both link and session are up. Returns the ticks taken.
#[allow(dead_code)]
pub fn bring_up(ml: &mut MockLoop) -> usize {
    for n in 1..=10 {
        ml.tick().expect("bring-up tick");
        if ml.connectivity().link().is_connected() && ml.messaging().is_connected() {
            return n;
        }
    }
    panic!("link/session did not come up");
}
