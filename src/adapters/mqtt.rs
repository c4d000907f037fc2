//! MQTT-over-TLS session adapter.
//!
//! Implements [`SessionTransport`] on top of the ESP-IDF MQTT client.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient::new_cb`. The client runs
//!   in its own FreeRTOS task and reports through a callback, which only
//!   posts into the shared [`Inbox`].
//! - **all other targets**: an in-process simulated broker driven by the
//!   `sim_*` methods, delivering through the same [`Inbox`].
//!
//! ## Session model
//!
//! `open` blocks until the broker answers or the socket timeout expires.
//! A dropped session is reported once as [`TransportEvent::Closed`]; the
//! client is then torn down so it cannot reconnect behind the core's back
//! with a stale client identifier.
//!
//! Outside `open`, a `Connected` or `Refused` from the client means it went
//! through its own reconnect cycle and the subscription is gone. `poll`
//! reports both as `Closed` so the core opens a fresh session.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::app::ports::{Refusal, SessionParams, SessionTransport, TransportEvent};

use super::inbox::{Inbox, InboxItem};
use super::tls::TrustPolicy;

/// Client-side reason codes. Broker CONNACK codes are positive.
pub mod reason {
    /// The MQTT client reported a transport or TLS error.
    pub const TRANSPORT: i32 = -1;
    /// No answer within the socket timeout.
    pub const TIMEOUT: i32 = -2;
    /// The connection closed before the broker accepted it.
    pub const CLOSED: i32 = -3;
    /// Operation on a session that is not open.
    pub const NOT_OPEN: i32 = -4;
}

/// Inbox poll interval while waiting for the broker's answer.
const CONNECT_POLL_MS: u32 = 10;

pub struct MqttAdapter {
    inbox: Arc<Inbox>,
    trust: TrustPolicy,
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

impl MqttAdapter {
    pub fn new(trust: TrustPolicy) -> Self {
        Self {
            inbox: Arc::new(Inbox::new()),
            trust,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker::default(),
        }
    }

    pub fn trust(&self) -> TrustPolicy {
        self.trust
    }

    pub fn inbox(&self) -> &Arc<Inbox> {
        &self.inbox
    }

    /// Wait for the broker's verdict on a connection attempt.
    fn await_connack(&mut self, timeout_secs: u16) -> Result<(), Refusal> {
        let budget_ms = u32::from(timeout_secs) * 1000;
        let mut waited = 0u32;
        while waited < budget_ms {
            match self.inbox.take() {
                Some(InboxItem::Connected) => return Ok(()),
                Some(InboxItem::Refused(code)) => {
                    self.teardown();
                    return Err(Refusal { code });
                }
                Some(InboxItem::Closed) => {
                    self.teardown();
                    return Err(Refusal {
                        code: reason::CLOSED,
                    });
                }
                Some(InboxItem::Message(m)) => {
                    debug!("mqtt: discarding early publish on '{}'", m.topic);
                }
                None => {
                    idle_ms(CONNECT_POLL_MS);
                    waited += CONNECT_POLL_MS;
                }
            }
        }
        warn!("mqtt: no answer within {}s", timeout_secs);
        self.teardown();
        Err(Refusal {
            code: reason::TIMEOUT,
        })
    }

    fn teardown(&mut self) {
        self.platform_close();
        self.inbox.drain();
    }
}

impl SessionTransport for MqttAdapter {
    fn open(&mut self, params: &SessionParams<'_>) -> Result<(), Refusal> {
        self.teardown();
        self.platform_open(params)?;
        self.await_connack(params.socket_timeout_secs)?;
        info!("mqtt: session open ({:?})", self.trust);
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Refusal> {
        self.platform_subscribe(topic)
    }

    fn poll(&mut self) -> TransportEvent {
        match self.inbox.take() {
            Some(InboxItem::Message(m)) => TransportEvent::Message(m),
            Some(InboxItem::Closed) => TransportEvent::Closed,
            Some(InboxItem::Connected) => {
                warn!("mqtt: client reconnected on its own, resubscribe needed");
                TransportEvent::Closed
            }
            Some(InboxItem::Refused(code)) => {
                warn!("mqtt: reconnect refused out of band (rc={})", code);
                TransportEvent::Closed
            }
            None => TransportEvent::Idle,
        }
    }

    fn close(&mut self) {
        self.platform_close();
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn idle_ms(ms: u32) {
    esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(target_os = "espidf")]
impl MqttAdapter {
    fn platform_open(&mut self, params: &SessionParams<'_>) -> Result<(), Refusal> {
        use core::time::Duration;
        use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};
        use esp_idf_svc::tls::X509;

        let url = format!("mqtts://{}:{}", params.host, params.port);

        let mut conf = MqttClientConfiguration {
            client_id: Some(params.client_id),
            username: params.username,
            password: params.password,
            keep_alive_interval: Some(Duration::from_secs(u64::from(params.keepalive_secs))),
            network_timeout: Duration::from_secs(u64::from(params.socket_timeout_secs)),
            ..Default::default()
        };
        match self.trust {
            TrustPolicy::AcceptAny => {
                conf.skip_cert_common_name_check = true;
            }
            TrustPolicy::PinnedAuthority(pem) => {
                conf.server_certificate = Some(X509::pem_until_nul(pem.as_bytes()));
            }
            TrustPolicy::CertificateBundle => {
                conf.crt_bundle_attach = Some(esp_idf_svc::sys::esp_crt_bundle_attach);
            }
        }

        let inbox = Arc::clone(&self.inbox);
        let mut up = false;
        let client = EspMqttClient::new_cb(&url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                up = true;
                inbox.post(InboxItem::Connected);
            }
            EventPayload::Disconnected => {
                if up {
                    up = false;
                    inbox.post(InboxItem::Closed);
                } else {
                    inbox.post(InboxItem::Refused(reason::CLOSED));
                }
            }
            EventPayload::Received {
                topic: Some(topic),
                data,
                ..
            } => {
                inbox.post(InboxItem::Message(crate::app::messaging::InboundMessage::new(
                    topic, data,
                )));
            }
            EventPayload::Error(e) => {
                warn!("mqtt: client error {}", e);
                if !up {
                    inbox.post(InboxItem::Refused(reason::TRANSPORT));
                }
            }
            _ => {}
        })
        .map_err(|e| {
            warn!("mqtt: client init failed: {}", e);
            Refusal {
                code: reason::TRANSPORT,
            }
        })?;

        self.client = Some(client);
        Ok(())
    }

    fn platform_subscribe(&mut self, topic: &str) -> Result<(), Refusal> {
        use esp_idf_svc::mqtt::client::QoS;

        let client = self.client.as_mut().ok_or(Refusal {
            code: reason::NOT_OPEN,
        })?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|e| {
                warn!("mqtt: subscribe '{}' failed: {}", topic, e);
                Refusal {
                    code: reason::TRANSPORT,
                }
            })
    }

    fn platform_close(&mut self) {
        // Dropping the client stops its task and frees the TLS session.
        if self.client.take().is_some() {
            info!("mqtt: client closed");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// In-process broker for host builds.
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimBroker {
    open: bool,
    refuse_next: Option<i32>,
    silent_next: bool,
    client_ids: Vec<String>,
    subscriptions: Vec<String>,
}

#[cfg(not(target_os = "espidf"))]
fn idle_ms(_ms: u32) {
    // The simulated broker answers synchronously; nothing to wait for.
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    fn platform_open(&mut self, params: &SessionParams<'_>) -> Result<(), Refusal> {
        self.sim.client_ids.push(params.client_id.into());
        if let Some(code) = self.sim.refuse_next.take() {
            info!("mqtt(sim): refusing {} with rc={}", params.client_id, code);
            self.inbox.post(InboxItem::Refused(code));
        } else if core::mem::take(&mut self.sim.silent_next) {
            info!("mqtt(sim): broker silent for {}", params.client_id);
        } else {
            self.sim.open = true;
            self.inbox.post(InboxItem::Connected);
        }
        Ok(())
    }

    fn platform_subscribe(&mut self, topic: &str) -> Result<(), Refusal> {
        if !self.sim.open {
            return Err(Refusal {
                code: reason::NOT_OPEN,
            });
        }
        self.sim.subscriptions.push(topic.into());
        Ok(())
    }

    fn platform_close(&mut self) {
        self.sim.open = false;
        self.sim.subscriptions.clear();
    }

    /// Publish `payload` on `topic` if a matching subscription exists.
    pub fn sim_inject(&mut self, topic: &str, payload: &[u8]) -> bool {
        if !self.sim.open || !self.sim.subscriptions.iter().any(|s| s == topic) {
            return false;
        }
        self.inbox.post(InboxItem::Message(
            crate::app::messaging::InboundMessage::new(topic, payload),
        ))
    }

    /// Drop the open session as a network failure would.
    pub fn sim_drop(&mut self) {
        if self.sim.open {
            self.sim.open = false;
            self.inbox.post(InboxItem::Closed);
        }
    }

    /// Reconnect on the client's own initiative, losing the subscription
    /// and the `Closed` notice, as after an inbox overflow.
    pub fn sim_rejoin(&mut self) {
        self.sim.open = true;
        self.sim.subscriptions.clear();
        self.inbox.post(InboxItem::Connected);
    }

    /// Refuse the next connection attempt with `code`.
    pub fn sim_refuse_next(&mut self, code: i32) {
        self.sim.refuse_next = Some(code);
    }

    /// Leave the next connection attempt unanswered.
    pub fn sim_silent_next(&mut self) {
        self.sim.silent_next = true;
    }

    pub fn sim_is_open(&self) -> bool {
        self.sim.open
    }

    pub fn sim_client_ids(&self) -> &[String] {
        &self.sim.client_ids
    }

    pub fn sim_subscriptions(&self) -> &[String] {
        &self.sim.subscriptions
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
