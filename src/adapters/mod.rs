//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements       | Connects to               |
//! |-------------|------------------|---------------------------|
//! | `hardware`  | DotOutput        | Six LEDC servo channels   |
//! | `wifi`      | WifiPort         | ESP-IDF WiFi STA          |
//! | `mqtt`      | SessionTransport | ESP-IDF MQTT over TLS     |
//! | `entropy`   | EntropySource    | ESP32 hardware RNG        |
//! | `log_sink`  | EventSink        | Serial log output         |
//! | `time`      | DelayNs          | FreeRTOS delay, esp_timer |
//!
//! `inbox` and `tls` are support modules for `mqtt`.

pub mod entropy;
pub mod hardware;
pub mod inbox;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod tls;
pub mod wifi;
