//! WiFi station-mode adapter.
//!
//! Implements [`WifiPort`], the hexagonal boundary for the radio. The
//! join/retry policy lives in the core's connectivity manager; this
//! adapter only starts associations and reports status.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use log::{info, warn};

use crate::app::ports::{RadioStatus, WifiPort};

// ───────────────────────────────────────────────────────────────
// ESP-IDF driver
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiAdapter {
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    joining: bool,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(wifi: esp_idf_svc::wifi::EspWifi<'static>) -> Self {
        Self {
            wifi,
            joining: false,
        }
    }
}

#[cfg(target_os = "espidf")]
impl WifiPort for WifiAdapter {
    fn disconnect(&mut self) {
        self.joining = false;
        if self.wifi.is_started().unwrap_or(false) {
            if let Err(e) = self.wifi.disconnect() {
                // Not associated is the common case here.
                log::debug!("WiFi: disconnect: {}", e);
            }
        }
    }

    fn begin(&mut self, ssid: &str, password: &str) {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().unwrap_or_default(),
            password: password.try_into().unwrap_or_default(),
            auth_method,
            ..Default::default()
        });

        if let Err(e) = self.wifi.set_configuration(&config) {
            warn!("WiFi: set_configuration failed: {}", e);
            return;
        }
        if !self.wifi.is_started().unwrap_or(false) {
            if let Err(e) = self.wifi.start() {
                warn!("WiFi: start failed: {}", e);
                return;
            }
        }
        match self.wifi.connect() {
            Ok(()) => {
                self.joining = true;
                info!("WiFi: associating with '{}'", ssid);
            }
            Err(e) => warn!("WiFi: connect failed: {}", e),
        }
    }

    fn status(&mut self) -> RadioStatus {
        let associated = self.wifi.is_connected().unwrap_or(false);
        let has_ip = self.wifi.is_up().unwrap_or(false);
        match (associated && has_ip, self.joining) {
            (true, _) => RadioStatus::Connected,
            (false, true) => RadioStatus::Associating,
            (false, false) => RadioStatus::Idle,
        }
    }

    fn rssi(&self) -> Option<i8> {
        use esp_idf_svc::sys::*;
        let mut ap_info: wifi_ap_record_t = unsafe { core::mem::zeroed() };
        // SAFETY: ap_info is a valid, exclusively owned out-parameter.
        let ret = unsafe { esp_wifi_sta_get_ap_info(&mut ap_info) };
        if ret == ESP_OK as i32 {
            Some(ap_info.rssi)
        } else {
            None
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// Simulated access point behaviour.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimAccessPoint {
    /// Associates after `polls` status reads.
    Reachable { polls: u32 },
    /// SSID not on air.
    Absent,
    /// Rejects the passphrase.
    WrongPassword,
}

#[cfg(not(target_os = "espidf"))]
pub struct WifiAdapter {
    ap: SimAccessPoint,
    joining: bool,
    connected: bool,
    countdown: u32,
    /// Counts begin() calls, used to vary the simulated RSSI.
    sim_connect_counter: u32,
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self::with_access_point(SimAccessPoint::Reachable { polls: 2 })
    }

    pub fn with_access_point(ap: SimAccessPoint) -> Self {
        Self {
            ap,
            joining: false,
            connected: false,
            countdown: 0,
            sim_connect_counter: 0,
        }
    }

    pub fn sim_set_access_point(&mut self, ap: SimAccessPoint) {
        self.ap = ap;
    }

    /// Drop the association as if the AP went away.
    pub fn sim_drop(&mut self) {
        if self.connected {
            warn!("WiFi(sim): association dropped");
        }
        self.connected = false;
        self.joining = false;
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiPort for WifiAdapter {
    fn disconnect(&mut self) {
        self.connected = false;
        self.joining = false;
    }

    fn begin(&mut self, ssid: &str, _password: &str) {
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        self.joining = true;
        self.countdown = match self.ap {
            SimAccessPoint::Reachable { polls } => polls,
            _ => 0,
        };
        info!(
            "WiFi(sim): associating with '{}' (attempt {})",
            ssid, self.sim_connect_counter
        );
    }

    fn status(&mut self) -> RadioStatus {
        if self.connected {
            return RadioStatus::Connected;
        }
        if !self.joining {
            return RadioStatus::Idle;
        }
        match self.ap {
            SimAccessPoint::Absent => RadioStatus::NoSsid,
            SimAccessPoint::WrongPassword => RadioStatus::AuthRejected,
            SimAccessPoint::Reachable { .. } if self.countdown == 0 => {
                self.connected = true;
                self.joining = false;
                RadioStatus::Connected
            }
            SimAccessPoint::Reachable { .. } => {
                self.countdown -= 1;
                RadioStatus::Associating
            }
        }
    }

    fn rssi(&self) -> Option<i8> {
        if !self.connected {
            return None;
        }
        // Oscillate between -66 and -55 dBm across attempts.
        let oscillation = ((self.sim_connect_counter % 12) as i8) - 6;
        Some(-60_i8.saturating_add(oscillation))
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
