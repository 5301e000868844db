//! Command-line surface.
//!
//! Every tuning flag is optional and overrides the value from `--config`
//! (or the built-in default).  Flag names keep the underscore spelling the
//! deployed systemd units already pass.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{CoopConfig, StepMode};
use crate::door::Action;
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "coopdoor", version, about = "Light-driven chicken coop door controller")]
pub struct Cli {
    /// JSON config file used as the base before flag overrides
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the scheduled control loop (default)
    Run,
    /// Open or close the door once, unless it is already there
    Door {
        #[arg(value_enum)]
        action: DoorArg,
    },
    /// Take one averaged light reading and print it
    Measure,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorArg {
    Open,
    Close,
}

impl From<DoorArg> for Action {
    fn from(arg: DoorArg) -> Self {
        match arg {
            DoorArg::Open => Action::Open,
            DoorArg::Close => Action::Close,
        }
    }
}

#[derive(clap::Args, Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    /// Readings per trend window
    #[arg(long = "trend_len", global = true)]
    pub trend_len: Option<usize>,

    /// Minutes between light readings
    #[arg(long = "reading_intervals", global = true)]
    pub reading_intervals: Option<u32>,

    /// Raw samples averaged into one reading
    #[arg(long = "reading_samples", global = true)]
    pub reading_samples: Option<u32>,

    /// Seconds to wait before each raw sample
    #[arg(long = "resistor_time", global = true)]
    pub resistor_time: Option<f64>,

    /// GPIO (BCM) that charges the capacitor
    #[arg(long = "charging_pin", global = true)]
    pub charging_pin: Option<u8>,

    /// GPIO (BCM) that senses the capacitor
    #[arg(long = "reading_pin", global = true)]
    pub reading_pin: Option<u8>,

    /// Door state file
    #[arg(long = "state_log", global = true)]
    pub state_log: Option<PathBuf>,

    /// Earliest opening hour (0-12)
    #[arg(long = "early_open", global = true)]
    pub early_open: Option<u8>,

    /// Latest opening hour (0-12)
    #[arg(long = "late_open", global = true)]
    pub late_open: Option<u8>,

    /// Earliest closing hour (13-23)
    #[arg(long = "early_close", global = true)]
    pub early_close: Option<u8>,

    /// Latest closing hour (13-23)
    #[arg(long = "late_close", global = true)]
    pub late_close: Option<u8>,

    /// Seconds between motor steps
    #[arg(long = "step_time", global = true)]
    pub step_time: Option<f64>,

    /// Motor revolutions per door movement
    #[arg(long = "revolutions", global = true)]
    pub revolutions: Option<f64>,

    /// 1 = half step, 2 = full step
    #[arg(long = "step_size", global = true)]
    pub step_size: Option<u8>,

    /// Driver board pins in1 in2 in3 in4 (BCM)
    #[arg(long = "driver_pins", num_args = 4, value_names = ["IN1", "IN2", "IN3", "IN4"], global = true)]
    pub driver_pins: Option<Vec<u8>>,
}

impl Overrides {
    /// Apply every flag that was given on top of `base`.
    pub fn apply(&self, mut base: CoopConfig) -> Result<CoopConfig, ConfigError> {
        let s = &mut base.sensor;
        if let Some(v) = self.trend_len {
            s.trend_len = v;
        }
        if let Some(v) = self.reading_samples {
            s.reading_samples = v;
        }
        if let Some(v) = self.resistor_time {
            s.resistor_time_secs = v;
        }
        if let Some(v) = self.charging_pin {
            s.charging_pin = v;
        }
        if let Some(v) = self.reading_pin {
            s.reading_pin = v;
        }

        let sch = &mut base.schedule;
        if let Some(v) = self.early_open {
            sch.early_open = v;
        }
        if let Some(v) = self.late_open {
            sch.late_open = v;
        }
        if let Some(v) = self.early_close {
            sch.early_close = v;
        }
        if let Some(v) = self.late_close {
            sch.late_close = v;
        }

        let m = &mut base.motor;
        if let Some(v) = self.step_time {
            m.step_time_secs = v;
        }
        if let Some(v) = self.revolutions {
            m.revolutions = v;
        }
        if let Some(v) = self.step_size {
            m.step_mode = StepMode::from_step_size(v)?;
        }
        if let Some(pins) = &self.driver_pins {
            m.driver_pins = pins
                .as_slice()
                .try_into()
                .map_err(|_| ConfigError::ValidationFailed("driver_pins takes exactly 4 pins"))?;
        }

        if let Some(v) = self.reading_intervals {
            base.timing.reading_interval_mins = v;
        }
        if let Some(v) = &self.state_log {
            base.state_log = v.clone();
        }
        Ok(base)
    }
}

impl Cli {
    /// Defaults, then `--config`, then flags; validated.
    pub fn into_config(&self) -> Result<CoopConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => CoopConfig::from_json_file(path)?,
            None => CoopConfig::default(),
        };
        let config = self.overrides.apply(base)?;
        config.validate()?;
        Ok(config)
    }

    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}
