//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! One line per event, prefixed by subsystem.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::LinkAttempt { ssid } => {
                info!("LINK | joining ssid='{}'", ssid);
            }
            AppEvent::LinkProgress {
                polls,
                elapsed_ms,
                status,
            } => {
                info!(
                    "LINK | waiting {}.{}s | polls={} | status={:?}",
                    elapsed_ms / 1000,
                    (elapsed_ms % 1000) / 100,
                    polls,
                    status
                );
            }
            AppEvent::LinkUp { rssi } => match rssi {
                Some(dbm) => info!("LINK | up | RSSI={}dBm", dbm),
                None => info!("LINK | up | RSSI=n/a"),
            },
            AppEvent::LinkFailed(e) => {
                warn!("LINK | join failed: {}", e);
            }
            AppEvent::LinkLost => {
                warn!("LINK | association lost");
            }
            AppEvent::SessionAttempt { client_id } => {
                info!("MQTT | connecting client_id={}", client_id);
            }
            AppEvent::SessionUp { client_id } => {
                info!("MQTT | connected client_id={}", client_id);
            }
            AppEvent::SessionRefused {
                error,
                code,
                backoff_ms,
            } => {
                warn!(
                    "MQTT | refused rc={} ({}) | retry in {}ms",
                    code, error, backoff_ms
                );
            }
            AppEvent::SessionLost => {
                warn!("MQTT | session lost");
            }
            AppEvent::PatternApplied(p) => {
                info!(
                    "CELL | '{}' {} bits=0b{:06b}",
                    p.letter().unwrap_or('?'),
                    p,
                    p.bits()
                );
            }
            AppEvent::DecodeRejected(e) => {
                warn!("CELL | rejected: {} | all dots lowered", e);
            }
        }
    }
}
