//! Wall-clock time adapter.
//!
//! Implements [`ClockPort`] with the host's local time (`chrono::Local`)
//! and shutdown-aware sleeps.  The controller has no clock sync of its own;
//! the OS is trusted to keep local time.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};

use crate::app::ports::ClockPort;
use crate::error::Result;
use crate::shutdown::ShutdownSignal;

pub struct SystemClock {
    shutdown: ShutdownSignal,
}

impl SystemClock {
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self { shutdown }
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&mut self, duration: Duration) -> Result<()> {
        self.shutdown.sleep(duration)
    }
}
