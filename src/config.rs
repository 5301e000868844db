//! System configuration parameters
//!
//! All tunable parameters for the coop door controller.  Built once at
//! startup (defaults, optional JSON file, then command-line overrides),
//! validated, and handed to each component by reference.  Nothing mutates
//! it afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins;
use crate::trend::MAX_TREND_LEN;

/// Half-steps per output-shaft revolution of the 28BYJ-48.
pub const HALF_STEPS_PER_REV: u32 = 4096;
/// Full steps per output-shaft revolution of the 28BYJ-48.
pub const FULL_STEPS_PER_REV: u32 = 2048;
/// Longest travel accepted for one door movement.
pub const MAX_REVOLUTIONS: f64 = 100.0;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoopConfig {
    pub sensor: SensorConfig,
    pub schedule: ScheduleConfig,
    pub motor: MotorConfig,
    pub timing: TimingConfig,
    /// Where the door state record lives.
    pub state_log: PathBuf,
}

/// Photoresistor sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Readings per trend window.
    pub trend_len: usize,
    /// Raw RC samples averaged into one reading.
    pub reading_samples: u32,
    /// Seconds to wait before each raw RC sample.
    pub resistor_time_secs: f64,
    pub charging_pin: u8,
    pub reading_pin: u8,
    /// Give up on a single RC sample after this long.
    pub trip_timeout_ms: u64,
}

/// Open/close windows, whole hours of the local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub early_open: u8,
    pub late_open: u8,
    pub early_close: u8,
    pub late_close: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    Half,
    Full,
}

impl StepMode {
    /// Map the `--step_size` flag (1 = half, 2 = full).
    pub fn from_step_size(size: u8) -> Result<Self, ConfigError> {
        match size {
            1 => Ok(Self::Half),
            2 => Ok(Self::Full),
            _ => Err(ConfigError::ValidationFailed("step_size must be 1 (half) or 2 (full)")),
        }
    }

    pub fn steps_per_rev(self) -> u32 {
        match self {
            Self::Half => HALF_STEPS_PER_REV,
            Self::Full => FULL_STEPS_PER_REV,
        }
    }
}

/// Stepper drive parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Driver board in1..in4.
    pub driver_pins: [u8; 4],
    pub step_mode: StepMode,
    pub revolutions: f64,
    /// Seconds between steps.
    pub step_time_secs: f64,
}

impl MotorConfig {
    /// Steps for the configured revolutions, rounded down.
    pub fn step_count(&self) -> u32 {
        (self.revolutions * f64::from(self.step_mode.steps_per_rev())).floor() as u32
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_secs_f64(self.step_time_secs)
    }
}

/// Control loop cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Minutes between trend readings.
    pub reading_interval_mins: u32,
    /// Seconds to idle before re-evaluating the schedule.
    pub poll_interval_secs: u32,
}

impl TimingConfig {
    pub fn reading_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.reading_interval_mins) * 60)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_interval_secs))
    }
}

impl Default for CoopConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            schedule: ScheduleConfig::default(),
            motor: MotorConfig::default(),
            timing: TimingConfig::default(),
            state_log: PathBuf::from("../data/state_log.txt"),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            trend_len: 5,
            reading_samples: 10,
            resistor_time_secs: 2.0,
            charging_pin: pins::CHARGING_PIN,
            reading_pin: pins::READING_PIN,
            trip_timeout_ms: 5_000,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            early_open: 5,
            late_open: 7,
            early_close: 17,
            late_close: 20,
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            driver_pins: pins::DRIVER_PINS,
            step_mode: StepMode::Half,
            revolutions: 3.0,
            step_time_secs: 0.001,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reading_interval_mins: 15,
            poll_interval_secs: 60,
        }
    }
}

impl CoopConfig {
    /// Load a JSON config file.  Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable(e.kind()))?;
        serde_json::from_str(&text).map_err(|_| ConfigError::Malformed)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sensor;
        if s.trend_len < 2 {
            return Err(ConfigError::ValidationFailed("trend_len must be >= 2"));
        }
        if s.trend_len > MAX_TREND_LEN {
            return Err(ConfigError::ValidationFailed("trend_len must be <= 32"));
        }
        if s.reading_samples == 0 {
            return Err(ConfigError::ValidationFailed("reading_samples must be >= 1"));
        }
        if !s.resistor_time_secs.is_finite() || s.resistor_time_secs < 0.0 {
            return Err(ConfigError::ValidationFailed("resistor_time must be >= 0"));
        }
        if s.trip_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("trip_timeout_ms must be > 0"));
        }

        let sch = &self.schedule;
        if sch.early_open > 12 || sch.late_open > 12 {
            return Err(ConfigError::ValidationFailed("open hours must be 0-12"));
        }
        if !(13..=23).contains(&sch.early_close) || !(13..=23).contains(&sch.late_close) {
            return Err(ConfigError::ValidationFailed("close hours must be 13-23"));
        }
        if sch.early_open >= sch.late_open {
            return Err(ConfigError::ValidationFailed("early_open must be before late_open"));
        }
        if sch.early_close >= sch.late_close {
            return Err(ConfigError::ValidationFailed("early_close must be before late_close"));
        }

        let m = &self.motor;
        if !m.revolutions.is_finite() || m.revolutions <= 0.0 {
            return Err(ConfigError::ValidationFailed("revolutions must be a positive number"));
        }
        if m.revolutions > MAX_REVOLUTIONS {
            return Err(ConfigError::ValidationFailed("revolutions must be <= 100"));
        }
        if m.step_count() == 0 {
            return Err(ConfigError::ValidationFailed("revolutions too small for a single step"));
        }
        if !m.step_time_secs.is_finite() || m.step_time_secs < 0.0 {
            return Err(ConfigError::ValidationFailed("step_time must be >= 0"));
        }

        let mut all_pins = Vec::with_capacity(6);
        all_pins.extend_from_slice(&m.driver_pins);
        all_pins.push(s.charging_pin);
        all_pins.push(s.reading_pin);
        if all_pins.iter().any(|&p| p > pins::MAX_BCM_PIN) {
            return Err(ConfigError::ValidationFailed("GPIO pins must be BCM 0-27"));
        }
        all_pins.sort_unstable();
        if all_pins.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::ValidationFailed("GPIO pins must be distinct"));
        }

        if self.timing.reading_interval_mins == 0 {
            return Err(ConfigError::ValidationFailed("reading_intervals must be >= 1 minute"));
        }
        if self.timing.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("poll interval must be > 0"));
        }
        Ok(())
    }
}
