//! One-shot hardware peripheral initialization.
//!
//! Configures the LEDC timer and the six servo channels using raw ESP-IDF
//! sys calls. Called once from `main()` before the main loop starts.
//! [`LedcChannel`] then exposes each configured channel through
//! [`embedded_hal::pwm::SetDutyCycle`].

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcTimerFailed(i32),
    LedcChannelFailed { channel: u32, rc: i32 },
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc) => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed { channel, rc } => {
                write!(f, "LEDC channel {} config failed (rc={})", channel, rc)
            }
        }
    }
}

impl core::error::Error for HwInitError {}

/// Largest duty value at [`pins::SERVO_DUTY_BITS`].
pub const SERVO_MAX_DUTY: u16 = ((1u32 << pins::SERVO_DUTY_BITS) - 1) as u16;

/// LEDC channel for dot `index` (0-based).
pub const fn servo_channel(index: usize) -> u32 {
    index as u32
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the main loop; single-threaded.
    unsafe { init_ledc() }?;
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: dot servos (50 Hz, 14-bit)
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: pins::SERVO_DUTY_BITS,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcTimerFailed(ret));
    }

    // Channels 0-5: one per dot. Duty 0 keeps the servos unpowered until
    // the actuator controller drives them to Lowered.
    for (i, &gpio) in pins::DOT_SERVO_GPIOS.iter().enumerate() {
        let channel = servo_channel(i);
        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel: ledc_channel_t_LEDC_CHANNEL_0 + channel,
                timer_sel: ledc_timer_t_LEDC_TIMER_0,
                gpio_num: gpio,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcChannelFailed { channel, rc: ret });
        }
    }

    info!("hw_init: LEDC configured (servos=CH0-5 @ {} Hz)", pins::SERVO_PWM_FREQ_HZ);
    Ok(())
}

/// Write a raw duty value to a configured servo channel.
#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u16) {
    // SAFETY: channels were configured in init_ledc(); duty register
    // writes are race-free since only the main loop calls this function.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u16) {}

// ── SetDutyCycle handle ──────────────────────────────────────

/// One configured servo channel.
#[derive(Debug)]
pub struct LedcChannel {
    channel: u32,
    duty: u16,
}

impl LedcChannel {
    pub fn new(channel: u32) -> Self {
        Self { channel, duty: 0 }
    }

    /// The six dot channels, index 0 = dot 1.
    pub fn servo_bank() -> [Self; 6] {
        core::array::from_fn(|i| Self::new(servo_channel(i)))
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Last duty written.
    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl ErrorType for LedcChannel {
    type Error = Infallible;
}

impl SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        SERVO_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(SERVO_MAX_DUTY);
        ledc_set(self.channel, duty);
        self.duty = duty;
        Ok(())
    }
}
