//! Integration tests for the MainLoop → decode → actuator pipeline.
//!
//! These run on the host (x86_64) against the recording mocks in
//! `mock_hw` and drive the loop one tick at a time.

use braillecell::app::events::AppEvent;
use braillecell::app::ports::{RadioStatus, Refusal, TransportEvent};
use braillecell::braille::{BraillePattern, DotState, decode};
use braillecell::error::{DecodeError, Error, NetworkError, SessionError};

use crate::mock_hw::{BrokerCall, DotWrite, MockBroker, MockRadio, bring_up, mock_loop};

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_drives_every_dot_lowered() {
    let ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    let writes = &ml.cell().output().writes;
    assert_eq!(writes.len(), 6);
    assert!(writes.iter().all(|w| w.state == DotState::Lowered));
    assert_eq!(ml.cell().bank(), [DotState::Lowered; 6]);
}

#[test]
fn link_then_session_then_pulse() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());

    assert_eq!(ml.tick(), Ok(None));
    assert!(ml.connectivity().link().is_connected());
    assert!(!ml.messaging().is_connected());

    assert_eq!(ml.tick(), Ok(None));
    assert!(ml.messaging().is_connected());

    let broker = ml.messaging().transport();
    assert_eq!(
        broker.calls[0],
        BrokerCall::Open {
            client_id: "BrailleCell-bee0".into(),
            username: None,
            keepalive_secs: 60,
            socket_timeout_secs: 30,
        }
    );
    assert_eq!(broker.calls[1], BrokerCall::Subscribe("braille".into()));

    // Confirmation pulse: all raised, then all six lowered.
    let writes = &ml.cell().output().writes[6..];
    assert_eq!(writes.len(), 12);
    assert!(writes[..6].iter().all(|w| w.state == DotState::Raised));
    assert!(writes[6..].iter().all(|w| w.state == DotState::Lowered));
    assert_eq!(ml.cell().bank(), [DotState::Lowered; 6]);
}

// ── Letters ───────────────────────────────────────────────────

#[test]
fn lowercase_a_raises_dot_one() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);

    ml.messaging_mut().transport_mut().publish("braille", b"a");
    let shown = ml.tick().unwrap();

    assert_eq!(shown, Some(decode(b"A").unwrap()));
    assert_eq!(ml.cell().output().raised_dots(), vec![1]);
    assert!(ml.sink().events.contains(&AppEvent::PatternApplied(decode(b"a").unwrap())));
}

#[test]
fn uppercase_z_raises_one_three_five_six() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);

    ml.messaging_mut().transport_mut().publish("braille", b"Z");
    ml.tick().unwrap();

    assert_eq!(ml.cell().output().raised_dots(), vec![1, 3, 5, 6]);
    assert_eq!(
        ml.cell().bank(),
        [
            DotState::Raised,
            DotState::Lowered,
            DotState::Raised,
            DotState::Lowered,
            DotState::Raised,
            DotState::Raised,
        ]
    );
}

#[test]
fn only_first_byte_is_interpreted() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);

    ml.messaging_mut().transport_mut().publish("braille", b"kitten");
    assert_eq!(ml.tick(), Ok(Some(decode(b"k").unwrap())));
}

#[test]
fn digit_is_rejected_and_lowers_everything() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);

    ml.messaging_mut().transport_mut().publish("braille", b"Q");
    ml.tick().unwrap();
    let before = ml.cell().output().writes.len();

    ml.messaging_mut().transport_mut().publish("braille", b"3");
    assert_eq!(
        ml.tick(),
        Err(Error::Decode(DecodeError::InvalidLetter(b'3')))
    );

    // All six outputs written, even those already lowered.
    let writes = &ml.cell().output().writes[before..];
    assert_eq!(writes.len(), 6);
    assert!(writes.iter().all(|w| w.state == DotState::Lowered));
    assert_eq!(ml.cell().pattern(), BraillePattern::ALL_LOWERED);
    assert!(ml
        .sink()
        .events
        .contains(&AppEvent::DecodeRejected(DecodeError::InvalidLetter(b'3'))));
}

#[test]
fn empty_payload_is_rejected_and_lowers_everything() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);

    ml.messaging_mut().transport_mut().publish("braille", b"y");
    ml.tick().unwrap();

    ml.messaging_mut().transport_mut().publish("braille", b"");
    assert_eq!(ml.tick(), Err(Error::Decode(DecodeError::Empty)));
    assert!(ml.cell().output().raised_dots().is_empty());
}

#[test]
fn repeated_letter_writes_nothing_new() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);

    ml.messaging_mut().transport_mut().publish("braille", b"n");
    ml.tick().unwrap();
    let before = ml.cell().output().writes.len();

    ml.messaging_mut().transport_mut().publish("braille", b"N");
    ml.tick().unwrap();
    assert_eq!(ml.cell().output().writes.len(), before);
}

#[test]
fn messages_are_rendered_one_per_tick_in_order() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);

    for b in [b"c", b"a", b"t"] {
        ml.messaging_mut().transport_mut().publish("braille", b);
    }
    let shown: Vec<Option<char>> = (0..3)
        .map(|_| ml.tick().unwrap().and_then(BraillePattern::letter))
        .collect();
    assert_eq!(shown, vec![Some('C'), Some('A'), Some('T')]);
    assert_eq!(ml.tick(), Ok(None));
}

#[test]
fn other_topics_are_ignored() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);
    let before = ml.cell().output().writes.len();

    ml.messaging_mut().transport_mut().publish("braille/debug", b"x");
    assert_eq!(ml.tick(), Ok(None));
    assert_eq!(ml.cell().output().writes.len(), before);
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn unreachable_network_fails_after_twenty_seconds_and_retries() {
    let mut ml = mock_loop(MockRadio::stuck(RadioStatus::Associating), MockBroker::default());

    assert_eq!(ml.tick(), Err(Error::Network(NetworkError::Timeout)));
    // settle + 40 polls + idle
    assert_eq!(ml.delay().ms(), 1000 + 20_000 + 10);
    assert_eq!(
        ml.sink()
            .count(|e| matches!(e, AppEvent::LinkProgress { .. })),
        4
    );
    assert!(ml.messaging().transport().calls.is_empty());

    assert!(ml.tick().is_err());
    assert_eq!(ml.connectivity().wifi().begins(), 2);
}

#[test]
fn missing_ssid_is_classified() {
    let mut ml = mock_loop(MockRadio::stuck(RadioStatus::NoSsid), MockBroker::default());
    assert_eq!(ml.tick(), Err(Error::Network(NetworkError::SsidNotFound)));
}

#[test]
fn broker_refusal_backs_off_then_retries_with_fresh_id() {
    let mut broker = MockBroker::default();
    broker.open_results.push_back(Err(Refusal { code: 4 }));
    let mut ml = mock_loop(MockRadio::connecting(), broker);

    ml.tick().unwrap(); // link up
    let before = ml.delay().ms();
    assert_eq!(
        ml.tick(),
        Err(Error::Session(SessionError::MalformedCredentials))
    );
    assert_eq!(ml.delay().ms() - before, 5000 + 10);

    // No pulse on failure: only the six boot writes so far.
    assert_eq!(ml.cell().output().writes.len(), 6);

    ml.tick().unwrap();
    assert!(ml.messaging().is_connected());
    assert_eq!(
        ml.messaging().transport().client_ids(),
        vec!["BrailleCell-bee0".to_string(), "BrailleCell-bee1".to_string()]
    );
}

#[test]
fn transport_failure_codes_are_classified() {
    let mut broker = MockBroker::default();
    broker.open_results.push_back(Err(Refusal { code: -2 }));
    broker.open_results.push_back(Err(Refusal { code: 2 }));
    let mut ml = mock_loop(MockRadio::connecting(), broker);

    ml.tick().unwrap();
    assert_eq!(
        ml.tick(),
        Err(Error::Session(SessionError::TransportFailure))
    );
    assert_eq!(ml.tick(), Err(Error::Session(SessionError::BrokerRefusal)));
}

// ── Pumping ───────────────────────────────────────────────────

#[test]
fn transport_is_pumped_while_the_link_join_fails() {
    let mut broker = MockBroker::default();
    broker.pending.push_back(TransportEvent::Closed);
    let mut ml = mock_loop(MockRadio::stuck(RadioStatus::Associating), broker);

    assert_eq!(ml.tick(), Err(Error::Network(NetworkError::Timeout)));
    let broker = ml.messaging().transport();
    assert_eq!(broker.polls, 1);
    assert!(broker.pending.is_empty());

    assert!(ml.tick().is_err());
    assert_eq!(ml.messaging().transport().polls, 2);
}

#[test]
fn transport_is_pumped_when_the_session_is_refused() {
    let mut broker = MockBroker::default();
    broker.open_results.push_back(Err(Refusal { code: 2 }));
    let mut ml = mock_loop(MockRadio::connecting(), broker);

    ml.tick().unwrap(); // link up
    ml.messaging_mut()
        .transport_mut()
        .pending
        .push_back(TransportEvent::Closed);
    assert_eq!(ml.tick(), Err(Error::Session(SessionError::BrokerRefusal)));

    let broker = ml.messaging().transport();
    assert_eq!(broker.polls, 2);
    assert!(broker.pending.is_empty());
}

#[test]
fn transport_is_pumped_once_per_connected_tick() {
    let mut ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    bring_up(&mut ml);
    let before = ml.messaging().transport().polls;

    for _ in 0..5 {
        assert_eq!(ml.tick(), Ok(None));
    }
    assert_eq!(ml.messaging().transport().polls - before, 5);
}

#[test]
fn letter_pumped_on_a_failed_join_tick_is_still_rendered() {
    let mut broker = MockBroker::default();
    broker.publish("braille", b"d");
    let mut ml = mock_loop(MockRadio::stuck(RadioStatus::Idle), broker);

    assert_eq!(ml.tick(), Ok(Some(decode(b"d").unwrap())));
    assert_eq!(ml.cell().output().raised_dots(), vec![1, 4, 5]);
    assert!(ml
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::LinkFailed(_))));
}

#[test]
fn boot_writes_are_the_expected_six() {
    let ml = mock_loop(MockRadio::connecting(), MockBroker::default());
    let expected: Vec<DotWrite> = (0..6)
        .map(|index| DotWrite {
            index,
            state: DotState::Lowered,
        })
        .collect();
    assert_eq!(ml.cell().output().writes, expected);
}
