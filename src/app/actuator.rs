//! Actuator controller: the six-dot bank and its fail-safe.
//!
//! ```text
//!   BraillePattern ──▶ ActuatorController ──▶ DotOutput (servos)
//!                        [DotState; 6]
//! ```
//!
//! The controller keeps the last state written to every dot so that
//! [`apply`](ActuatorController::apply) only touches dots that change.
//! [`all_lowered`](ActuatorController::all_lowered) writes every output
//! regardless, so it also recovers from an output that drifted.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::braille::{BraillePattern, DOT_COUNT, DotState};

use super::ports::DotOutput;

/// Current state of the six dots, index 0 = dot 1.
pub type ActuatorBank = [DotState; DOT_COUNT];

/// Owns the dot outputs and the bank mirroring them.
pub struct ActuatorController<O: DotOutput> {
    output: O,
    bank: ActuatorBank,
}

impl<O: DotOutput> ActuatorController<O> {
    /// Take ownership of the outputs and drive them all to Lowered.
    pub fn new(output: O) -> Self {
        let mut ctl = Self {
            output,
            bank: [DotState::Lowered; DOT_COUNT],
        };
        ctl.all_lowered();
        ctl
    }

    /// Render `pattern`, writing only the dots whose state changes.
    pub fn apply(&mut self, pattern: BraillePattern) {
        let target = pattern.dots();
        let mut written = 0u8;
        for (i, (&want, have)) in target.iter().zip(self.bank.iter_mut()).enumerate() {
            if want != *have {
                self.output.set_dot(i, want);
                *have = want;
                written += 1;
            }
        }
        debug!("cell: applied {:?} ({} dot writes)", pattern, written);
    }

    /// Force every dot to Lowered. Writes all six outputs unconditionally.
    pub fn all_lowered(&mut self) {
        for (i, dot) in self.bank.iter_mut().enumerate() {
            self.output.set_dot(i, DotState::Lowered);
            *dot = DotState::Lowered;
        }
    }

    /// Raise every dot, hold for `hold_ms`, then lower them all.
    pub fn confirmation_pulse(&mut self, delay: &mut impl DelayNs, hold_ms: u32) {
        self.apply(BraillePattern::ALL_RAISED);
        delay.delay_ms(hold_ms);
        self.all_lowered();
    }

    pub fn bank(&self) -> ActuatorBank {
        self.bank
    }

    /// The bank as a pattern value.
    pub fn pattern(&self) -> BraillePattern {
        let bits = self
            .bank
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_raised())
            .fold(0u8, |acc, (i, _)| acc | (1 << i));
        BraillePattern::from_bits(bits)
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}
