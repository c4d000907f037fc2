//! Messaging client: broker session lifecycle and inbound pump.
//!
//! ```text
//!  Disconnected ──ensure_session_connected──▶ Connecting ──open+subscribe──▶ Connected
//!       ▲                                        │ refused                       │
//!       │                                        ▼                               │
//!       └──────────── backoff (5 s), Err ────────┘                               │
//!       └──────────────────────── transport Closed (pump_messages) ─────────────┘
//! ```
//!
//! A session attempt only starts while the network link is Connected. Each
//! attempt uses a fresh client identifier so a half-open session left on
//! the broker by the previous attempt cannot collide with the new one.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::{BrokerConfig, ClientIdPrefix, Hostname, Secret, TimingConfig, Topic};
use crate::error::SessionError;

use super::actuator::ActuatorController;
use super::connectivity::NetworkLink;
use super::events::AppEvent;
use super::ports::{DotOutput, EntropySource, EventSink, SessionParams, SessionTransport, TransportEvent};

/// Per-attempt client identifier: configured prefix + 4 hex digits.
pub type ClientId = heapless::String<27>;

/// Retained payload bytes. Only byte 0 is ever interpreted.
pub const PAYLOAD_CAPACITY: usize = 32;

/// One publish received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: Topic,
    pub payload: heapless::Vec<u8, PAYLOAD_CAPACITY>,
}

impl InboundMessage {
    /// Build a message, truncating the topic and payload to capacity.
    pub fn new(topic: &str, payload: &[u8]) -> Self {
        let mut t = Topic::new();
        for ch in topic.chars() {
            if t.push(ch).is_err() {
                break;
            }
        }
        let keep = payload.len().min(PAYLOAD_CAPACITY);
        let mut p = heapless::Vec::new();
        let _ = p.extend_from_slice(&payload[..keep]);
        Self { topic: t, payload: p }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Observable state of the broker session.
#[derive(Debug, Clone)]
pub struct MessagingSession {
    pub status: SessionStatus,
    /// Identifier of the most recent attempt.
    pub client_id: Option<ClientId>,
    pub topic: Topic,
    pub keepalive_secs: u16,
    pub socket_timeout_secs: u16,
}

pub struct MessagingClient<T: SessionTransport, R: EntropySource> {
    transport: T,
    entropy: R,
    session: MessagingSession,
    host: Hostname,
    port: u16,
    username: Option<Secret>,
    password: Option<Secret>,
    prefix: ClientIdPrefix,
    backoff_ms: u32,
    confirm_hold_ms: u32,
}

impl<T: SessionTransport, R: EntropySource> MessagingClient<T, R> {
    pub fn new(transport: T, entropy: R, broker: &BrokerConfig, timing: &TimingConfig) -> Self {
        Self {
            transport,
            entropy,
            session: MessagingSession {
                status: SessionStatus::Disconnected,
                client_id: None,
                topic: broker.topic.clone(),
                keepalive_secs: broker.keepalive_secs,
                socket_timeout_secs: broker.socket_timeout_secs,
            },
            host: broker.host.clone(),
            port: broker.port,
            username: broker.username.clone(),
            password: broker.password.clone(),
            prefix: broker.client_id_prefix.clone(),
            backoff_ms: timing.session_backoff_ms,
            confirm_hold_ms: timing.confirm_hold_ms,
        }
    }

    pub fn session(&self) -> &MessagingSession {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.status == SessionStatus::Connected
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn next_client_id(&mut self) -> ClientId {
        let mut id = ClientId::new();
        let _ = id.push_str(&self.prefix);
        let suffix = self.entropy.next_u32() & 0xFFFF;
        let _ = write!(id, "{:04x}", suffix);
        id
    }

    /// Run one session attempt unless already Connected.
    ///
    /// On success the cell shows the confirmation pulse. On failure the
    /// call sleeps the backoff before returning the error.
    pub fn ensure_session_connected<O: DotOutput>(
        &mut self,
        link: &NetworkLink,
        cell: &mut ActuatorController<O>,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<(), SessionError> {
        if self.is_connected() {
            return Ok(());
        }
        if !link.is_connected() {
            return Err(SessionError::LinkDown);
        }

        let client_id = self.next_client_id();
        self.session.status = SessionStatus::Connecting;
        self.session.client_id = Some(client_id.clone());
        info!(
            "mqtt: connecting to {}:{} as {}",
            self.host, self.port, client_id
        );
        sink.emit(&AppEvent::SessionAttempt {
            client_id: client_id.clone(),
        });

        let params = SessionParams {
            host: &self.host,
            port: self.port,
            client_id: &client_id,
            username: self.username.as_deref(),
            password: self.password.as_deref(),
            keepalive_secs: self.session.keepalive_secs,
            socket_timeout_secs: self.session.socket_timeout_secs,
        };

        let mut opened = self.transport.open(&params);
        if opened.is_ok() {
            opened = self.transport.subscribe(&self.session.topic);
            if opened.is_err() {
                self.transport.close();
            }
        }

        match opened {
            Ok(()) => {
                self.session.status = SessionStatus::Connected;
                info!("mqtt: subscribed to '{}'", self.session.topic);
                sink.emit(&AppEvent::SessionUp { client_id });
                cell.confirmation_pulse(delay, self.confirm_hold_ms);
                Ok(())
            }
            Err(refusal) => {
                let err = SessionError::from_reason_code(refusal.code);
                self.session.status = SessionStatus::Disconnected;
                warn!(
                    "mqtt: connect failed, rc={} ({}); retrying in {} ms",
                    refusal.code, err, self.backoff_ms
                );
                sink.emit(&AppEvent::SessionRefused {
                    error: err,
                    code: refusal.code,
                    backoff_ms: self.backoff_ms,
                });
                delay.delay_ms(self.backoff_ms);
                Err(err)
            }
        }
    }

    /// Service the transport and return at most one message on the
    /// subscribed topic.
    pub fn pump_messages(&mut self, sink: &mut impl EventSink) -> Option<InboundMessage> {
        match self.transport.poll() {
            TransportEvent::Idle => None,
            TransportEvent::Message(msg) if msg.topic == self.session.topic => Some(msg),
            TransportEvent::Message(msg) => {
                debug!("mqtt: dropping message on '{}'", msg.topic);
                None
            }
            TransportEvent::Closed => {
                if self.session.status != SessionStatus::Disconnected {
                    warn!("mqtt: session lost");
                    self.session.status = SessionStatus::Disconnected;
                    self.transport.close();
                    sink.emit(&AppEvent::SessionLost);
                }
                None
            }
        }
    }
}
