//! Hardware adapter: bridges the dot servos to the [`DotOutput`] port.
//!
//! Owns the six [`DotServo`]s. This is the only module in the system
//! that touches actuator hardware. On non-espidf targets the underlying
//! LEDC channels are cfg-gated simulation stubs.

use embedded_hal::pwm::SetDutyCycle;
use log::error;

use crate::app::ports::DotOutput;
use crate::braille::{DOT_COUNT, DotState};
use crate::config::ServoConfig;
use crate::drivers::servo::DotServo;

/// Concrete adapter holding one servo per dot, index 0 = dot 1.
pub struct ServoCell<P: SetDutyCycle> {
    servos: [DotServo<P>; DOT_COUNT],
    write_errors: u32,
}

impl<P: SetDutyCycle> ServoCell<P> {
    pub fn new(channels: [P; DOT_COUNT], cal: ServoConfig) -> Self {
        Self {
            servos: channels.map(|pwm| DotServo::new(pwm, cal)),
            write_errors: 0,
        }
    }

    pub fn servo(&self, index: usize) -> Option<&DotServo<P>> {
        self.servos.get(index)
    }

    /// PWM writes that failed since boot.
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }
}

// ── DotOutput implementation ──────────────────────────────────

impl<P: SetDutyCycle> DotOutput for ServoCell<P> {
    fn set_dot(&mut self, index: usize, state: DotState) {
        let Some(servo) = self.servos.get_mut(index) else {
            error!("cell: dot index {} out of range", index);
            return;
        };
        if let Err(e) = servo.set(state) {
            self.write_errors = self.write_errors.saturating_add(1);
            error!("cell: dot {} PWM write failed: {:?}", index + 1, e);
        }
    }
}
