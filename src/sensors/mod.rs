//! Sensor drivers.

pub mod photocell;
