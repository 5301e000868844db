//! Pin ownership and the stepper actuator.

pub mod gpio;
pub mod stepper;
