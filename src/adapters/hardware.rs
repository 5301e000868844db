//! Hardware adapter: bridges the pin header to domain port traits.
//!
//! Owns the [`GpioBank`] and the [`Photocell`], exposing them through
//! [`GpioPort`] and [`LightSensorPort`].  This is the only module in the
//! system that holds real pins.  Without the `rpi` feature the bank is the
//! in-memory simulation backend.

use embedded_hal::digital::PinState;

use crate::app::ports::{GpioPort, LightSensorPort};
use crate::drivers::gpio::GpioBank;
use crate::error::{HardwareError, Result};
use crate::sensors::photocell::Photocell;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    gpio: GpioBank,
    photocell: Photocell,
}

impl HardwareAdapter {
    pub fn new(gpio: GpioBank, photocell: Photocell) -> Self {
        Self { gpio, photocell }
    }
}

// ── GpioPort implementation ───────────────────────────────────

impl GpioPort for HardwareAdapter {
    fn configure_output(&mut self, pin: u8) -> core::result::Result<(), HardwareError> {
        self.gpio.configure_output(pin)
    }

    fn configure_input(&mut self, pin: u8) -> core::result::Result<(), HardwareError> {
        self.gpio.configure_input(pin)
    }

    fn write(&mut self, pin: u8, level: PinState) -> core::result::Result<(), HardwareError> {
        self.gpio.write(pin, level)
    }

    fn read(&mut self, pin: u8) -> core::result::Result<PinState, HardwareError> {
        self.gpio.read(pin)
    }

    fn release_all(&mut self) {
        self.gpio.release_all();
    }
}

// ── LightSensorPort implementation ────────────────────────────

impl LightSensorPort for HardwareAdapter {
    fn take_reading(&mut self, sample_count: u32) -> Result<f64> {
        self.photocell.take_measurement(&mut self.gpio, sample_count)
    }
}
