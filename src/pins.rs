//! GPIO / peripheral pin assignments for the BrailleCell board.
//!
//! Single source of truth. Every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Dot servos (SG90-class, 50 Hz hobby PWM)
// ---------------------------------------------------------------------------

/// Servo signal GPIO per dot, index 0 = dot 1.
///
/// Dots 1–3 are the left column top to bottom, dots 4–6 the right column.
pub const DOT_SERVO_GPIOS: [i32; 6] = [13, 12, 14, 27, 26, 25];

/// Servo refresh rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;

/// LEDC duty resolution for the servo timer. 14 bits at 50 Hz gives
/// ~1.2 µs per step.
pub const SERVO_DUTY_BITS: u32 = 14;
