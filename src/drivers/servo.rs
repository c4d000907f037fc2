//! Hobby-servo driver for one Braille dot.
//!
//! Maps a [`DotState`] to a shaft angle and the angle to a PWM duty cycle
//! with a linear pulse-width calibration:
//!
//! ```text
//!   pulse_us = min_pulse + (max_pulse − min_pulse) · angle / 180
//!   duty     = pulse_us · max_duty / period_us
//! ```
//!
//! ## Dual-target design
//!
//! Generic over [`SetDutyCycle`], so on ESP-IDF it drives an LEDC channel
//! and on host/test a recording mock.

use embedded_hal::pwm::SetDutyCycle;

use crate::braille::DotState;
use crate::config::ServoConfig;

pub struct DotServo<P: SetDutyCycle> {
    pwm: P,
    cal: ServoConfig,
    state: Option<DotState>,
}

impl<P: SetDutyCycle> DotServo<P> {
    pub fn new(pwm: P, cal: ServoConfig) -> Self {
        Self {
            pwm,
            cal,
            state: None,
        }
    }

    pub fn angle_for(&self, state: DotState) -> u8 {
        match state {
            DotState::Raised => self.cal.raised_angle_deg,
            DotState::Lowered => self.cal.lowered_angle_deg,
        }
    }

    pub fn pulse_us(&self, angle_deg: u8) -> u32 {
        let angle = u32::from(angle_deg.min(180));
        let min = u32::from(self.cal.min_pulse_us);
        let max = u32::from(self.cal.max_pulse_us);
        min + (max - min) * angle / 180
    }

    pub fn duty_for(&self, pulse_us: u32) -> u16 {
        let max_duty = u32::from(self.pwm.max_duty_cycle());
        let period = u32::from(self.cal.period_us).max(1);
        (pulse_us * max_duty / period).min(max_duty) as u16
    }

    /// Drive the dot to `state`.
    pub fn set(&mut self, state: DotState) -> Result<(), P::Error> {
        let duty = self.duty_for(self.pulse_us(self.angle_for(state)));
        self.pwm.set_duty_cycle(duty)?;
        self.state = Some(state);
        Ok(())
    }

    /// Last state written successfully, `None` before the first write.
    pub fn state(&self) -> Option<DotState> {
        self.state
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
