//! Main loop: the single-threaded cooperative scheduler.
//!
//! ```text
//!  tick:  link down?     ──▶ ConnectivityManager::ensure_connected
//!         session down?  ──▶ MessagingClient::ensure_session_connected
//!         pump_messages  ──▶ decode ──▶ apply | all_lowered
//!         idle 10 ms
//! ```
//!
//! Every collaborator is owned here; nothing is global. All waiting happens
//! inside the injected [`DelayNs`].

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::braille::{self, BraillePattern};
use crate::config::DeviceConfig;
use crate::error::Result;

use super::actuator::ActuatorController;
use super::connectivity::ConnectivityManager;
use super::events::AppEvent;
use super::messaging::MessagingClient;
use super::ports::{DotOutput, EntropySource, EventSink, SessionTransport, WifiPort};

pub struct MainLoop<W, T, R, O, D, E>
where
    W: WifiPort,
    T: SessionTransport,
    R: EntropySource,
    O: DotOutput,
    D: DelayNs,
    E: EventSink,
{
    link: ConnectivityManager<W>,
    session: MessagingClient<T, R>,
    cell: ActuatorController<O>,
    delay: D,
    sink: E,
    tick_idle_ms: u32,
}

impl<W, T, R, O, D, E> MainLoop<W, T, R, O, D, E>
where
    W: WifiPort,
    T: SessionTransport,
    R: EntropySource,
    O: DotOutput,
    D: DelayNs,
    E: EventSink,
{
    /// Wire the collaborators together. The cell starts all Lowered.
    pub fn new(
        config: &DeviceConfig,
        wifi: W,
        transport: T,
        entropy: R,
        output: O,
        delay: D,
        sink: E,
    ) -> Self {
        Self {
            link: ConnectivityManager::new(wifi, &config.wifi, &config.timing),
            session: MessagingClient::new(transport, entropy, &config.broker, &config.timing),
            cell: ActuatorController::new(output),
            delay,
            sink,
            tick_idle_ms: config.timing.tick_idle_ms,
        }
    }

    /// One scheduler cycle.
    ///
    /// Returns the pattern rendered this tick, `None` if nothing was
    /// rendered, or the non-fatal error the tick ran into. A message pumped
    /// this tick decides the result; otherwise a failed link or session
    /// attempt does. The idle sleep runs in every case.
    pub fn tick(&mut self) -> Result<Option<BraillePattern>> {
        let outcome = self.step();
        self.delay.delay_ms(self.tick_idle_ms);
        outcome
    }

    fn step(&mut self) -> Result<Option<BraillePattern>> {
        let attempt: Result<()> = if !self.link.poll_link(&mut self.sink) {
            self.link
                .ensure_connected(&mut self.delay, &mut self.sink)
                .map_err(Into::into)
        } else if !self.session.is_connected() {
            self.session
                .ensure_session_connected(
                    self.link.link(),
                    &mut self.cell,
                    &mut self.delay,
                    &mut self.sink,
                )
                .map_err(Into::into)
        } else {
            Ok(())
        };

        // The transport is serviced on every tick, including failed ones.
        let Some(msg) = self.session.pump_messages(&mut self.sink) else {
            return attempt.map(|()| None);
        };

        match braille::decode(&msg.payload) {
            Ok(pattern) => {
                self.cell.apply(pattern);
                info!("cell: {:?} -> {}", pattern.letter(), pattern);
                self.sink.emit(&AppEvent::PatternApplied(pattern));
                Ok(Some(pattern))
            }
            Err(e) => {
                warn!("cell: rejected payload ({}), lowering all dots", e);
                self.cell.all_lowered();
                self.sink.emit(&AppEvent::DecodeRejected(e));
                Err(e.into())
            }
        }
    }

    /// Tick forever. Errors never stop the loop.
    pub fn run(&mut self) -> ! {
        info!("main loop running");
        loop {
            if let Err(e) = self.tick() {
                debug!("tick: {}", e);
            }
        }
    }

    pub fn connectivity(&self) -> &ConnectivityManager<W> {
        &self.link
    }

    pub fn connectivity_mut(&mut self) -> &mut ConnectivityManager<W> {
        &mut self.link
    }

    pub fn messaging(&self) -> &MessagingClient<T, R> {
        &self.session
    }

    pub fn messaging_mut(&mut self) -> &mut MessagingClient<T, R> {
        &mut self.session
    }

    pub fn cell(&self) -> &ActuatorController<O> {
        &self.cell
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }
}
