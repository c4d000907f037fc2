//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock or simulated adapters. All tests run on the host (x86_64)
//! with no real hardware required.

mod main_loop_tests;
mod mock_hw;
mod sim_adapter_tests;
