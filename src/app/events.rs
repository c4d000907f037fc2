//! Outbound diagnostic events.
//!
//! The core emits these through the [`EventSink`](super::ports::EventSink)
//! port. Adapters on the other side decide what to do with them; the
//! firmware writes them to the serial log.

use crate::braille::BraillePattern;
use crate::config::Ssid;
use crate::error::{DecodeError, NetworkError, SessionError};

use super::messaging::ClientId;
use super::ports::RadioStatus;

/// Structured events emitted by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A bounded join attempt started.
    LinkAttempt { ssid: Ssid },

    /// Periodic snapshot while a join attempt is polling.
    LinkProgress {
        polls: u32,
        elapsed_ms: u32,
        status: RadioStatus,
    },

    /// The radio associated.
    LinkUp { rssi: Option<i8> },

    /// A join attempt exhausted its window.
    LinkFailed(NetworkError),

    /// An established association dropped.
    LinkLost,

    /// A broker session attempt started.
    SessionAttempt { client_id: ClientId },

    /// The session is open and subscribed.
    SessionUp { client_id: ClientId },

    /// A session attempt failed; the client backs off before the next one.
    SessionRefused {
        error: SessionError,
        code: i32,
        backoff_ms: u32,
    },

    /// An open session was closed by the transport.
    SessionLost,

    /// A letter was rendered on the cell.
    PatternApplied(BraillePattern),

    /// A payload was rejected and the cell forced to all-lowered.
    DecodeRejected(DecodeError),
}
