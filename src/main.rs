//! BrailleCell Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single-threaded cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ServoCell        WifiAdapter     MqttAdapter    HardwareRng   │
//! │  (DotOutput)      (WifiPort)      (Session-      (Entropy-     │
//! │                                    Transport)     Source)      │
//! │  LogEventSink     Esp32TimeAdapter                             │
//! │  (EventSink)      (DelayNs)                                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                  MainLoop (core)                       │    │
//! │  │  ConnectivityManager · MessagingClient ·               │    │
//! │  │  ActuatorController · braille::decode                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use braillecell::adapters::entropy::HardwareRng;
use braillecell::adapters::hardware::ServoCell;
use braillecell::adapters::log_sink::LogEventSink;
use braillecell::adapters::mqtt::MqttAdapter;
use braillecell::adapters::time::Esp32TimeAdapter;
use braillecell::adapters::tls::TrustPolicy;
use braillecell::adapters::wifi::WifiAdapter;
use braillecell::app::main_loop::MainLoop;
use braillecell::config::DeviceConfig;
use braillecell::drivers::hw_init::{self, LedcChannel};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BrailleCell v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (baked in at build time) ─────────────
    let config = DeviceConfig::from_build_env()?;
    let trust = TrustPolicy::from_build_env()?;
    info!(
        "Config: ssid='{}' broker={}:{} topic='{}' trust={:?}",
        config.wifi.ssid, config.broker.host, config.broker.port, config.broker.topic, trust
    );

    // ── 3. Servo outputs ──────────────────────────────────────
    hw_init::init_peripherals()?;
    let cell = ServoCell::new(LedcChannel::servo_bank(), config.servo);

    // ── 4. Radio ──────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;

    // ── 5. Compose and run ────────────────────────────────────
    let mut main_loop = MainLoop::new(
        &config,
        WifiAdapter::new(wifi),
        MqttAdapter::new(trust),
        HardwareRng::new(),
        cell,
        Esp32TimeAdapter::new(),
        LogEventSink::new(),
    );

    info!("System ready. Entering main loop.");
    main_loop.run()
}
