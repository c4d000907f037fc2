//! Connectivity manager: wireless link lifecycle.
//!
//! One call to [`ConnectivityManager::ensure_connected`] is one bounded
//! join attempt:
//!
//! ```text
//!  disconnect ─▶ settle ─▶ begin ─▶ poll status every 500 ms (≤ 40 polls)
//!                                     │ snapshot every 10 polls
//!                                     ├─▶ Connected
//!                                     └─▶ Failed(NetworkError)
//! ```
//!
//! Failure is not fatal. The main loop calls again on its next tick, which
//! gives unbounded retry at the loop's cadence without any unbounded wait
//! inside this module.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::{Passphrase, Ssid, TimingConfig, WifiConfig};
use crate::error::NetworkError;

use super::events::AppEvent;
use super::ports::{EventSink, RadioStatus, WifiPort};

/// Link lifecycle as seen by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Failed(NetworkError),
}

/// The single wireless link of the device.
#[derive(Debug, Clone)]
pub struct NetworkLink {
    state: LinkState,
    ssid: Ssid,
    password: Passphrase,
    rssi: Option<i8>,
}

impl NetworkLink {
    pub fn new(wifi: &WifiConfig) -> Self {
        Self {
            state: LinkState::Disconnected,
            ssid: wifi.ssid.clone(),
            password: wifi.password.clone(),
            rssi: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Last observed signal strength (dBm).
    pub fn rssi(&self) -> Option<i8> {
        self.rssi
    }
}

/// Polling schedule for one join attempt.
#[derive(Debug, Clone, Copy)]
struct JoinSchedule {
    settle_ms: u32,
    poll_ms: u32,
    max_polls: u32,
    snapshot_every: u32,
}

impl From<&TimingConfig> for JoinSchedule {
    fn from(t: &TimingConfig) -> Self {
        Self {
            settle_ms: t.link_settle_ms,
            poll_ms: t.link_poll_ms,
            max_polls: t.link_max_polls,
            snapshot_every: t.link_snapshot_every.max(1),
        }
    }
}

pub struct ConnectivityManager<W: WifiPort> {
    wifi: W,
    link: NetworkLink,
    schedule: JoinSchedule,
}

impl<W: WifiPort> ConnectivityManager<W> {
    pub fn new(wifi: W, config: &WifiConfig, timing: &TimingConfig) -> Self {
        Self {
            wifi,
            link: NetworkLink::new(config),
            schedule: JoinSchedule::from(timing),
        }
    }

    pub fn link(&self) -> &NetworkLink {
        &self.link
    }

    pub fn wifi(&self) -> &W {
        &self.wifi
    }

    pub fn wifi_mut(&mut self) -> &mut W {
        &mut self.wifi
    }

    /// Cheap per-tick health check. Returns whether the link is Connected.
    ///
    /// A Connected link whose radio no longer reports an association drops
    /// to Disconnected so the next tick starts a fresh join attempt.
    pub fn poll_link(&mut self, sink: &mut impl EventSink) -> bool {
        if self.link.state != LinkState::Connected {
            return false;
        }
        match self.wifi.status() {
            RadioStatus::Connected => {
                self.link.rssi = self.wifi.rssi();
                true
            }
            status => {
                warn!("link: association lost ({:?})", status);
                self.link.state = LinkState::Disconnected;
                self.link.rssi = None;
                sink.emit(&AppEvent::LinkLost);
                false
            }
        }
    }

    /// Run one bounded join attempt unless already Connected.
    pub fn ensure_connected(
        &mut self,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<(), NetworkError> {
        if self.link.state == LinkState::Connected {
            return Ok(());
        }

        let s = self.schedule;
        info!("link: joining '{}'", self.link.ssid);
        sink.emit(&AppEvent::LinkAttempt {
            ssid: self.link.ssid.clone(),
        });
        self.link.state = LinkState::Connecting;
        self.link.rssi = None;

        self.wifi.disconnect();
        delay.delay_ms(s.settle_ms);
        self.wifi.begin(&self.link.ssid, &self.link.password);

        let mut polls = 0u32;
        loop {
            let status = self.wifi.status();
            if status == RadioStatus::Connected {
                self.link.state = LinkState::Connected;
                self.link.rssi = self.wifi.rssi();
                info!(
                    "link: connected after {} ms (RSSI={:?})",
                    polls * s.poll_ms,
                    self.link.rssi
                );
                sink.emit(&AppEvent::LinkUp {
                    rssi: self.link.rssi,
                });
                return Ok(());
            }

            if polls >= s.max_polls {
                let err = classify(status);
                warn!("link: join failed after {} polls ({})", polls, err);
                self.link.state = LinkState::Failed(err);
                sink.emit(&AppEvent::LinkFailed(err));
                return Err(err);
            }

            delay.delay_ms(s.poll_ms);
            polls += 1;

            if polls % s.snapshot_every == 0 {
                sink.emit(&AppEvent::LinkProgress {
                    polls,
                    elapsed_ms: polls * s.poll_ms,
                    status,
                });
            }
        }
    }
}

fn classify(last: RadioStatus) -> NetworkError {
    match last {
        RadioStatus::NoSsid => NetworkError::SsidNotFound,
        RadioStatus::AuthRejected => NetworkError::AuthFailed,
        _ => NetworkError::Timeout,
    }
}
