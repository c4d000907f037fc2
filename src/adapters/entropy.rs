//! Hardware RNG adapter for client-identifier suffixes.
//!
//! The values only need to differ between attempts and between devices;
//! they are not secrets.

use crate::app::ports::EntropySource;

#[derive(Default)]
pub struct HardwareRng;

impl HardwareRng {
    pub fn new() -> Self {
        Self
    }
}

impl EntropySource for HardwareRng {
    /// ESP-IDF: the hardware RNG via `esp_random`. True random once the
    /// radio is running, which it is before any session attempt.
    #[cfg(target_os = "espidf")]
    fn next_u32(&mut self) -> u32 {
        // SAFETY: esp_random has no preconditions.
        unsafe { esp_idf_svc::sys::esp_random() }
    }

    /// Simulation: per-call `RandomState` keys, non-cryptographic.
    #[cfg(not(target_os = "espidf"))]
    fn next_u32(&mut self) -> u32 {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        RandomState::new().build_hasher().finish() as u32
    }
}
