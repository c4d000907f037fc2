//! Fuzz target: `DeviceConfig::from_json`
//!
//! Arbitrary documents must either be rejected or produce a configuration
//! whose `validate()` runs without panicking.
//!
//! cargo fuzz run fuzz_config

#![no_main]

use braillecell::config::DeviceConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = DeviceConfig::from_json(data) {
        let _ = cfg.validate();
    }
});
