//! BrailleCell firmware library.
//!
//! Exposes the core and the adapters for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod braille;
pub mod config;
pub mod error;
pub mod pins;

// The ESP-IDF parts of these are cfg-gated inside each module; host
// builds get the simulation stubs.
pub mod adapters;
pub mod drivers;
