//! Photoresistor light sensor read by RC timing.
//!
//! The photocell sits in series with a capacitor.  One sample drains the
//! capacitor, then charges it through the photocell and times how long the
//! reading pin takes to see HIGH.  Less light means more resistance, which
//! means a longer charge time.
//!
//! ```text
//!  charging_pin ──[ photocell ]──┬── reading_pin
//!                                │
//!                               ═╪═ C
//!                                │
//!                               GND
//! ```
//!
//! The trip poll is bounded by `trip_timeout`; an unplugged sensor yields
//! [`SensorError::Timeout`] instead of hanging the controller.

use std::time::{Duration, Instant};

use embedded_hal::digital::PinState;
use log::{debug, warn};

use crate::app::ports::GpioPort;
use crate::config::SensorConfig;
use crate::error::{Result, SensorError};
use crate::shutdown::ShutdownSignal;

/// Time the capacitor is held at ground before each charge.
const DRAIN_TIME: Duration = Duration::from_millis(200);

pub struct Photocell {
    charging_pin: u8,
    reading_pin: u8,
    resistor_time: Duration,
    trip_timeout: Duration,
    shutdown: ShutdownSignal,
}

impl Photocell {
    pub fn new(cfg: &SensorConfig, shutdown: ShutdownSignal) -> Self {
        Self {
            charging_pin: cfg.charging_pin,
            reading_pin: cfg.reading_pin,
            resistor_time: Duration::from_secs_f64(cfg.resistor_time_secs),
            trip_timeout: Duration::from_millis(cfg.trip_timeout_ms),
            shutdown,
        }
    }

    /// One RC sample, in seconds from charge start to input trip.
    pub fn rc_time(&self, gpio: &mut impl GpioPort) -> Result<f64> {
        gpio.configure_output(self.charging_pin)?;
        gpio.configure_output(self.reading_pin)?;
        gpio.write(self.charging_pin, PinState::Low)?;
        gpio.write(self.reading_pin, PinState::Low)?;
        self.shutdown.sleep(DRAIN_TIME)?;

        let start = Instant::now();
        gpio.configure_input(self.reading_pin)?;
        gpio.write(self.charging_pin, PinState::High)?;

        let tripped = loop {
            if gpio.read(self.reading_pin)? == PinState::High {
                break Ok(start.elapsed());
            }
            let waited = start.elapsed();
            if waited > self.trip_timeout {
                break Err(SensorError::Timeout {
                    pin: self.reading_pin,
                    waited_ms: waited.as_millis() as u64,
                });
            }
            std::hint::spin_loop();
        };

        gpio.write(self.charging_pin, PinState::Low)?;
        Ok(tripped?.as_secs_f64())
    }

    /// Average of `samples` RC samples, each preceded by `resistor_time`.
    pub fn take_measurement(&self, gpio: &mut impl GpioPort, samples: u32) -> Result<f64> {
        if samples == 0 {
            return Err(SensorError::NoSamples.into());
        }
        let mut total = 0.0;
        for i in 0..samples {
            self.shutdown.sleep(self.resistor_time)?;
            let sample = self.rc_time(gpio).inspect_err(|e| {
                warn!("photocell: sample {}/{} failed: {}", i + 1, samples, e);
            })?;
            total += sample;
        }
        let average = total / f64::from(samples);
        debug!("photocell: {} samples, average {:.6}s", samples, average);
        Ok(average)
    }
}
