//! Device configuration parameters
//!
//! All tunable parameters for the BrailleCell firmware. Credentials and
//! broker details are baked in at build time (see [`DeviceConfig::from_build_env`])
//! and stay fixed for the process lifetime.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub type Ssid = heapless::String<32>;
pub type Passphrase = heapless::String<64>;
pub type Hostname = heapless::String<128>;
pub type Topic = heapless::String<64>;
pub type Secret = heapless::String<64>;
pub type ClientIdPrefix = heapless::String<23>;

/// Core device configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub wifi: WifiConfig,
    pub broker: BrokerConfig,
    pub timing: TimingConfig,
    pub servo: ServoConfig,
}

/// Station-mode network join parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: Ssid,
    /// Empty for open networks.
    pub password: Passphrase,
}

/// MQTT broker session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: Hostname,
    /// 8883 = MQTT over TLS
    pub port: u16,
    /// `None` connects anonymously.
    pub username: Option<Secret>,
    pub password: Option<Secret>,
    /// Prefix for the per-attempt client identifier; a 4-hex-digit suffix
    /// is appended on each connection attempt.
    pub client_id_prefix: ClientIdPrefix,
    pub topic: Topic,
    pub keepalive_secs: u16,
    pub socket_timeout_secs: u16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: Hostname::new(),
            port: 8883,
            username: None,
            password: None,
            client_id_prefix: fixed("BrailleCell-"),
            topic: fixed("braille"),
            keepalive_secs: 60,
            socket_timeout_secs: 30,
        }
    }
}

/// Fixed delays and retry bounds for the connection state machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after dropping a stale association before re-joining.
    pub link_settle_ms: u32,
    /// Radio status poll interval during a join attempt.
    pub link_poll_ms: u32,
    /// Polls per join attempt (40 × 500 ms = 20 s ceiling).
    pub link_max_polls: u32,
    /// Emit a link diagnostic every N polls (10 × 500 ms = 5 s).
    pub link_snapshot_every: u32,
    /// Sleep after a failed broker session attempt.
    pub session_backoff_ms: u32,
    /// How long all six dots stay raised after a (re)connection.
    pub confirm_hold_ms: u32,
    /// Idle sleep at the end of each main-loop tick.
    pub tick_idle_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            link_settle_ms: 1000,
            link_poll_ms: 500,
            link_max_polls: 40,
            link_snapshot_every: 10,
            session_backoff_ms: 5000,
            confirm_hold_ms: 500,
            tick_idle_ms: 10,
        }
    }
}

/// Hobby-servo calibration shared by all six dots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    pub lowered_angle_deg: u8,
    pub raised_angle_deg: u8,
    /// Pulse width at 0°.
    pub min_pulse_us: u16,
    /// Pulse width at 180°.
    pub max_pulse_us: u16,
    /// PWM period (20 ms = 50 Hz).
    pub period_us: u16,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            lowered_angle_deg: 0,
            raised_angle_deg: 90,
            min_pulse_us: 500,
            max_pulse_us: 2400,
            period_us: 20_000,
        }
    }
}

fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}

fn fill<const N: usize>(
    dst: &mut heapless::String<N>,
    value: &str,
    field: &'static str,
) -> Result<(), ConfigError> {
    dst.clear();
    dst.push_str(value).map_err(|_| ConfigError::TooLong(field))
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Compile-time configuration document and per-field overrides.
struct BuildEnv {
    document: Option<&'static str>,
    wifi_ssid: Option<&'static str>,
    wifi_pass: Option<&'static str>,
    mqtt_host: Option<&'static str>,
    mqtt_port: Option<&'static str>,
    mqtt_user: Option<&'static str>,
    mqtt_pass: Option<&'static str>,
}

impl DeviceConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(bytes).map_err(|_| ConfigError::Malformed)
    }

    /// Load the configuration baked into the firmware image.
    ///
    /// Starts from the `BRAILLECELL_CONFIG` JSON document when set at build
    /// time (defaults otherwise), then applies the individual
    /// `BRAILLECELL_*` overrides, then validates.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_env(&BuildEnv {
            document: option_env!("BRAILLECELL_CONFIG"),
            wifi_ssid: option_env!("BRAILLECELL_WIFI_SSID"),
            wifi_pass: option_env!("BRAILLECELL_WIFI_PASS"),
            mqtt_host: option_env!("BRAILLECELL_MQTT_HOST"),
            mqtt_port: option_env!("BRAILLECELL_MQTT_PORT"),
            mqtt_user: option_env!("BRAILLECELL_MQTT_USER"),
            mqtt_pass: option_env!("BRAILLECELL_MQTT_PASS"),
        })
    }

    fn from_env(env: &BuildEnv) -> Result<Self, ConfigError> {
        let mut cfg = match env.document {
            Some(doc) => Self::from_json(doc.as_bytes())?,
            None => Self::default(),
        };

        if let Some(v) = env.wifi_ssid {
            fill(&mut cfg.wifi.ssid, v, "wifi.ssid")?;
        }
        if let Some(v) = env.wifi_pass {
            fill(&mut cfg.wifi.password, v, "wifi.password")?;
        }
        if let Some(v) = env.mqtt_host {
            fill(&mut cfg.broker.host, v, "broker.host")?;
        }
        if let Some(v) = env.mqtt_port {
            cfg.broker.port = v
                .parse()
                .map_err(|_| ConfigError::ValidationFailed("broker.port is not a number"))?;
        }
        if let Some(v) = env.mqtt_user {
            let mut user = Secret::new();
            fill(&mut user, v, "broker.username")?;
            cfg.broker.username = Some(user);
        }
        if let Some(v) = env.mqtt_pass {
            let mut pass = Secret::new();
            fill(&mut pass, v, "broker.password")?;
            cfg.broker.password = Some(pass);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ssid = self.wifi.ssid.as_str();
        if ssid.is_empty() || !is_printable_ascii(ssid) {
            return Err(ConfigError::ValidationFailed(
                "wifi.ssid must be 1-32 printable ASCII bytes",
            ));
        }
        let pass_len = self.wifi.password.len();
        if pass_len != 0 && !(8..=64).contains(&pass_len) {
            return Err(ConfigError::ValidationFailed(
                "wifi.password must be empty or 8-64 bytes",
            ));
        }

        let b = &self.broker;
        if b.host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker.host is empty"));
        }
        if b.port == 0 {
            return Err(ConfigError::ValidationFailed("broker.port is 0"));
        }
        if b.topic.is_empty() || b.topic.contains(['#', '+']) {
            return Err(ConfigError::ValidationFailed(
                "broker.topic must be a non-empty topic without wildcards",
            ));
        }
        if b.password.is_some() && b.username.is_none() {
            return Err(ConfigError::ValidationFailed(
                "broker.password set without broker.username",
            ));
        }
        if b.keepalive_secs == 0 || b.socket_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "broker keepalive/socket timeout must be non-zero",
            ));
        }

        let t = &self.timing;
        if t.link_poll_ms == 0 || t.link_max_polls == 0 || t.link_snapshot_every == 0 {
            return Err(ConfigError::ValidationFailed(
                "timing.link_* must be non-zero",
            ));
        }

        let s = &self.servo;
        if s.min_pulse_us >= s.max_pulse_us || s.max_pulse_us > s.period_us {
            return Err(ConfigError::ValidationFailed(
                "servo pulse range must satisfy min < max <= period",
            ));
        }
        if s.lowered_angle_deg > 180 || s.raised_angle_deg > 180 {
            return Err(ConfigError::ValidationFailed("servo angles must be 0-180"));
        }
        if s.lowered_angle_deg == s.raised_angle_deg {
            return Err(ConfigError::ValidationFailed(
                "servo raised and lowered angles are identical",
            ));
        }
        Ok(())
    }
}
