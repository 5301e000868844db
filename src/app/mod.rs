//! Application core: door control logic with no direct I/O.
//!
//! All interaction with pins, the light sensor, the clock and the state
//! file happens through **port traits** defined in [`ports`], keeping this
//! layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
