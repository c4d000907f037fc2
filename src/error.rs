//! Unified error types for the BrailleCell firmware.
//!
//! Every subsystem has its own small `Copy` enum; the top-level [`Error`]
//! wraps them so the main loop can report a tick's outcome uniformly.
//! None of these are fatal: the loop recovers from all of them.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The wireless link could not be established.
    Network(NetworkError),
    /// The pub/sub session could not be opened or was lost.
    Session(SessionError),
    /// An inbound payload did not name a letter.
    Decode(DecodeError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Session(e) => write!(f, "session: {e}"),
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

/// Why a bounded link attempt ended without an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// The attempt window elapsed without the radio reporting Connected.
    Timeout,
    /// The configured SSID was not visible.
    SsidNotFound,
    /// The access point rejected the passphrase.
    AuthFailed,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "association timed out"),
            Self::SsidNotFound => write!(f, "SSID not found"),
            Self::AuthFailed => write!(f, "authentication failed"),
        }
    }
}

impl core::error::Error for NetworkError {}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Why a broker session attempt failed or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The broker answered but refused the connection.
    BrokerRefusal,
    /// The broker rejected the username/password.
    MalformedCredentials,
    /// Socket, TLS, or timeout failure below the MQTT layer.
    TransportFailure,
    /// A session was requested while the wireless link was down.
    LinkDown,
}

impl SessionError {
    /// Classify a broker reason code.
    ///
    /// Positive values are MQTT 3.1.1 CONNACK return codes; negative values
    /// are client-side transport failures (timeout, connection lost, ...).
    pub const fn from_reason_code(code: i32) -> Self {
        match code {
            4 | 5 => Self::MalformedCredentials,
            1..=3 => Self::BrokerRefusal,
            _ => Self::TransportFailure,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokerRefusal => write!(f, "broker refused connection"),
            Self::MalformedCredentials => write!(f, "broker rejected credentials"),
            Self::TransportFailure => write!(f, "transport failure"),
            Self::LinkDown => write!(f, "wireless link down"),
        }
    }
}

impl core::error::Error for SessionError {}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// An inbound payload that does not decode to a Braille letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Zero-length payload.
    Empty,
    /// First byte (after case folding) is outside `A..=Z`.
    InvalidLetter(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty payload"),
            Self::InvalidLetter(b) if b.is_ascii_graphic() => {
                write!(f, "invalid letter '{}'", *b as char)
            }
            Self::InvalidLetter(b) => write!(f, "invalid letter 0x{:02X}", b),
        }
    }
}

impl core::error::Error for DecodeError {}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The baked-in JSON document did not parse.
    Malformed,
    /// A string did not fit its fixed-capacity field.
    TooLong(&'static str),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::TooLong(field) => write!(f, "{} too long", field),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
