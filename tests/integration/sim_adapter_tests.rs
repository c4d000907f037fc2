//! End-to-end tests with the real adapters in simulation mode.
//!
//! WifiAdapter, MqttAdapter (and its Inbox), HardwareRng, and ServoCell
//! all run their host stubs; only time is virtual.

use braillecell::adapters::entropy::HardwareRng;
use braillecell::adapters::hardware::ServoCell;
use braillecell::adapters::mqtt::MqttAdapter;
use braillecell::adapters::tls::TrustPolicy;
use braillecell::adapters::wifi::{SimAccessPoint, WifiAdapter};
use braillecell::app::main_loop::MainLoop;
use braillecell::braille::DotState;
use braillecell::drivers::hw_init::LedcChannel;
use braillecell::error::{Error, NetworkError};

use crate::mock_hw::{LogSink, MockDelay, test_config};

type SimLoop = MainLoop<
    WifiAdapter,
    MqttAdapter,
    HardwareRng,
    ServoCell<LedcChannel>,
    MockDelay,
    LogSink,
>;

fn sim_loop(ap: SimAccessPoint) -> SimLoop {
    let config = test_config();
    MainLoop::new(
        &config,
        WifiAdapter::with_access_point(ap),
        MqttAdapter::new(TrustPolicy::default()),
        HardwareRng::new(),
        ServoCell::new(LedcChannel::servo_bank(), config.servo),
        MockDelay::default(),
        LogSink::new(),
    )
}

fn duty(ml: &SimLoop, dot: usize) -> u16 {
    ml.cell()
        .output()
        .servo(dot - 1)
        .map(|s| s.pwm().duty())
        .unwrap_or_default()
}

#[test]
fn letter_reaches_the_servo_duty_registers() {
    let mut ml = sim_loop(SimAccessPoint::Reachable { polls: 3 });
    ml.tick().unwrap();
    ml.tick().unwrap();
    assert!(ml.messaging().is_connected());

    let mqtt = ml.messaging_mut().transport_mut();
    assert_eq!(mqtt.sim_subscriptions(), &["braille".to_string()]);
    assert!(mqtt.sim_client_ids()[0].starts_with("BrailleCell-"));
    assert!(mqtt.sim_inject("braille", b"e"));

    ml.tick().unwrap();

    // 'e' = dots 1 and 5
    let raised = 1187;
    let lowered = 409;
    assert_eq!(duty(&ml, 1), raised);
    assert_eq!(duty(&ml, 5), raised);
    for dot in [2, 3, 4, 6] {
        assert_eq!(duty(&ml, dot), lowered);
    }
    assert_eq!(
        ml.cell().output().servo(4).and_then(|s| s.state()),
        Some(DotState::Raised)
    );
}

#[test]
fn simulated_session_drop_recovers() {
    let mut ml = sim_loop(SimAccessPoint::Reachable { polls: 0 });
    ml.tick().unwrap();
    ml.tick().unwrap();

    ml.messaging_mut().transport_mut().sim_drop();
    ml.tick().unwrap();
    assert!(!ml.messaging().is_connected());

    ml.tick().unwrap();
    assert!(ml.messaging().is_connected());
    assert_eq!(ml.messaging().transport().sim_client_ids().len(), 2);
}

#[test]
fn silent_client_reconnect_forces_a_fresh_subscription() {
    let mut ml = sim_loop(SimAccessPoint::Reachable { polls: 0 });
    ml.tick().unwrap();
    ml.tick().unwrap();

    // The client rejoined by itself and the Closed notice never arrived.
    ml.messaging_mut().transport_mut().sim_rejoin();
    ml.tick().unwrap();
    assert!(!ml.messaging().is_connected());

    ml.tick().unwrap();
    let mqtt = ml.messaging_mut().transport_mut();
    assert_eq!(mqtt.sim_client_ids().len(), 2);
    assert_eq!(mqtt.sim_subscriptions(), &["braille".to_string()]);
    assert!(mqtt.sim_inject("braille", b"g"));
    assert_eq!(ml.tick().unwrap().and_then(|p| p.letter()), Some('G'));
}

#[test]
fn absent_access_point_reports_ssid_not_found() {
    let mut ml = sim_loop(SimAccessPoint::Absent);
    assert_eq!(ml.tick(), Err(Error::Network(NetworkError::SsidNotFound)));
    assert!(!ml.messaging().transport().sim_is_open());
}
