//! GPIO bank: the one owner of every pin the controller touches.
//!
//! ## Dual-target design
//!
//! With the `rpi` feature: claims pins through `rppal` (BCM numbering,
//! `/dev/gpiomem`).  Pins are held as `IoPin`s so the photocell's reading
//! pin can flip between output (drain) and input (measure).
//! Without it: an in-memory simulation that records levels and reads every
//! input HIGH, so the capacitor "charges" instantly.

use std::collections::BTreeMap;

use embedded_hal::digital::PinState;
use log::{debug, info};

use crate::app::ports::GpioPort;
use crate::error::HardwareError;

#[cfg(feature = "rpi")]
use rppal::gpio::{Gpio, IoPin, Level, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

#[cfg(not(feature = "rpi"))]
#[derive(Debug, Clone, Copy)]
struct SimPin {
    mode: PinMode,
    level: PinState,
}

pub struct GpioBank {
    #[cfg(feature = "rpi")]
    gpio: Gpio,
    #[cfg(feature = "rpi")]
    pins: BTreeMap<u8, (PinMode, IoPin)>,
    #[cfg(not(feature = "rpi"))]
    pins: BTreeMap<u8, SimPin>,
}

impl GpioBank {
    /// Open the GPIO peripheral.
    #[cfg(feature = "rpi")]
    pub fn new() -> Result<Self, HardwareError> {
        let gpio = Gpio::new().map_err(|e| {
            log::error!("gpio: cannot open peripheral: {}", e);
            HardwareError::Unavailable
        })?;
        info!("gpio: rppal backend ready");
        Ok(Self {
            gpio,
            pins: BTreeMap::new(),
        })
    }

    /// Open the simulated GPIO peripheral.
    #[cfg(not(feature = "rpi"))]
    pub fn new() -> Result<Self, HardwareError> {
        info!("gpio(sim): simulation backend, no pins are driven");
        Ok(Self {
            pins: BTreeMap::new(),
        })
    }

    /// Mode of a claimed pin.
    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        #[cfg(feature = "rpi")]
        {
            self.pins.get(&pin).map(|(mode, _)| *mode)
        }
        #[cfg(not(feature = "rpi"))]
        {
            self.pins.get(&pin).map(|p| p.mode)
        }
    }

    /// Number of pins currently claimed.
    pub fn claimed(&self) -> usize {
        self.pins.len()
    }

    #[cfg(feature = "rpi")]
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), HardwareError> {
        let rppal_mode = match mode {
            PinMode::Input => Mode::Input,
            PinMode::Output => Mode::Output,
        };
        if let Some((current, io)) = self.pins.get_mut(&pin) {
            io.set_mode(rppal_mode);
            *current = mode;
        } else {
            let io = self
                .gpio
                .get(pin)
                .map_err(|_| HardwareError::PinUnavailable(pin))?
                .into_io(rppal_mode);
            self.pins.insert(pin, (mode, io));
        }
        if mode == PinMode::Output {
            self.write(pin, PinState::Low)?;
        }
        Ok(())
    }

    #[cfg(not(feature = "rpi"))]
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), HardwareError> {
        let entry = self.pins.entry(pin).or_insert(SimPin {
            mode,
            level: PinState::Low,
        });
        entry.mode = mode;
        if mode == PinMode::Output {
            entry.level = PinState::Low;
        }
        Ok(())
    }
}

impl GpioPort for GpioBank {
    fn configure_output(&mut self, pin: u8) -> Result<(), HardwareError> {
        self.set_mode(pin, PinMode::Output)
    }

    fn configure_input(&mut self, pin: u8) -> Result<(), HardwareError> {
        self.set_mode(pin, PinMode::Input)
    }

    #[cfg(feature = "rpi")]
    fn write(&mut self, pin: u8, level: PinState) -> Result<(), HardwareError> {
        match self.pins.get_mut(&pin) {
            Some((PinMode::Output, io)) => {
                io.write(match level {
                    PinState::High => Level::High,
                    PinState::Low => Level::Low,
                });
                Ok(())
            }
            _ => Err(HardwareError::NotConfigured(pin)),
        }
    }

    #[cfg(not(feature = "rpi"))]
    fn write(&mut self, pin: u8, level: PinState) -> Result<(), HardwareError> {
        match self.pins.get_mut(&pin) {
            Some(p) if p.mode == PinMode::Output => {
                p.level = level;
                Ok(())
            }
            _ => Err(HardwareError::NotConfigured(pin)),
        }
    }

    #[cfg(feature = "rpi")]
    fn read(&mut self, pin: u8) -> Result<PinState, HardwareError> {
        match self.pins.get(&pin) {
            Some((PinMode::Input, io)) => Ok(match io.read() {
                Level::High => PinState::High,
                Level::Low => PinState::Low,
            }),
            _ => Err(HardwareError::NotConfigured(pin)),
        }
    }

    #[cfg(not(feature = "rpi"))]
    fn read(&mut self, pin: u8) -> Result<PinState, HardwareError> {
        match self.pins.get(&pin) {
            Some(p) if p.mode == PinMode::Input => Ok(PinState::High),
            _ => Err(HardwareError::NotConfigured(pin)),
        }
    }

    fn release_all(&mut self) {
        let outputs: Vec<u8> = self
            .pins
            .keys()
            .copied()
            .filter(|&p| self.mode(p) == Some(PinMode::Output))
            .collect();
        for pin in outputs {
            // Claimed outputs accept writes; nothing to report on failure.
            let _ = self.write(pin, PinState::Low);
        }
        let count = self.pins.len();
        self.pins.clear();
        debug!("gpio: released {} pins", count);
    }
}

impl Drop for GpioBank {
    fn drop(&mut self) {
        if !self.pins.is_empty() {
            self.release_all();
        }
    }
}
