//! Port traits: the hexagonal boundary between the core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ core (actuator · connectivity · messaging)
//! ```
//!
//! Driven adapters (servos, radio, MQTT client, entropy, diagnostics)
//! implement these traits. The core consumes them via generics, so it
//! never touches ESP-IDF directly. Fixed delays go through
//! [`embedded_hal::delay::DelayNs`] rather than a port of our own.

use crate::braille::DotState;

use super::messaging::InboundMessage;

// ───────────────────────────────────────────────────────────────
// Dot output port (driven adapter: core → actuators)
// ───────────────────────────────────────────────────────────────

/// Six independent Raised/Lowered outputs, index 0 = dot 1.
///
/// Writes are assumed to succeed; implementations log hardware errors
/// rather than report them.
pub trait DotOutput {
    fn set_dot(&mut self, index: usize, state: DotState);
}

// ───────────────────────────────────────────────────────────────
// WiFi port (driven adapter: core ↔ radio)
// ───────────────────────────────────────────────────────────────

/// Radio-level association status as reported by the WiFi driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioStatus {
    /// Not associated and not trying.
    Idle,
    /// Association in progress.
    Associating,
    /// Associated with an IP address.
    Connected,
    /// The configured SSID is not visible.
    NoSsid,
    /// The access point rejected the credentials.
    AuthRejected,
    /// A previously established association dropped.
    Lost,
}

/// Station-mode WiFi driver.
pub trait WifiPort {
    /// Drop any current or stale association.
    fn disconnect(&mut self);

    /// Start associating with `ssid`. Returns immediately; progress is
    /// observed through [`status`](Self::status).
    fn begin(&mut self, ssid: &str, password: &str);

    /// Current association status.
    fn status(&mut self) -> RadioStatus;

    /// Signal strength in dBm while associated.
    fn rssi(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Session transport port (driven adapter: core ↔ broker)
// ───────────────────────────────────────────────────────────────

/// Parameters for one session attempt.
#[derive(Debug, Clone, Copy)]
pub struct SessionParams<'a> {
    pub host: &'a str,
    pub port: u16,
    pub client_id: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub keepalive_secs: u16,
    pub socket_timeout_secs: u16,
}

/// A failed open or subscribe, carrying the broker/client reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refusal {
    pub code: i32,
}

/// What one [`SessionTransport::poll`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Nothing pending.
    Idle,
    /// A publish arrived.
    Message(InboundMessage),
    /// The transport lost the session.
    Closed,
}

/// Secured pub/sub transport (MQTT over TLS on the device).
pub trait SessionTransport {
    /// Open a session, blocking at most `params.socket_timeout_secs`.
    fn open(&mut self, params: &SessionParams<'_>) -> Result<(), Refusal>;

    fn subscribe(&mut self, topic: &str) -> Result<(), Refusal>;

    /// Service keepalive and return at most one pending event.
    fn poll(&mut self) -> TransportEvent;

    /// Tear the session down. Idempotent.
    fn close(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Entropy port (driven adapter: hardware RNG → core)
// ───────────────────────────────────────────────────────────────

/// Source of the random client-identifier suffix.
pub trait EntropySource {
    fn next_u32(&mut self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log today).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
