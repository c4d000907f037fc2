//! Application core: domain logic behind port traits.
//!
//! This module holds the rules of the Braille cell: the link and session
//! state machines, the actuator bank, and the loop that composes them.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer testable without real peripherals.

pub mod actuator;
pub mod connectivity;
pub mod events;
pub mod main_loop;
pub mod messaging;
pub mod ports;
