//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DoorService (domain)
//! ```
//!
//! Driven adapters (GPIO, light sensor, clock, state file, operator prompt,
//! event sinks) implement these traits.  The
//! [`DoorService`](super::service::DoorService) consumes them via generics,
//! so the domain core never touches hardware or the filesystem directly.

use std::time::Duration;

use chrono::NaiveDateTime;
use embedded_hal::digital::PinState;

use crate::door::DoorRecord;
use crate::error::{HardwareError, StoreError};

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain ↔ pin header)
// ───────────────────────────────────────────────────────────────

/// Pin-level access by BCM number.
///
/// The controller owns the only implementation for the whole process
/// lifetime; nothing else touches the pins.
pub trait GpioPort {
    /// Claim `pin` as an output, driven LOW.
    fn configure_output(&mut self, pin: u8) -> Result<(), HardwareError>;

    /// Claim `pin` as a floating input.
    fn configure_input(&mut self, pin: u8) -> Result<(), HardwareError>;

    /// Drive an output pin.
    fn write(&mut self, pin: u8, level: PinState) -> Result<(), HardwareError>;

    /// Sample an input pin.
    fn read(&mut self, pin: u8) -> Result<PinState, HardwareError>;

    /// Drive every claimed output LOW and release all pins.  Infallible:
    /// this runs on the shutdown path.
    fn release_all(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Light sensor port (driven adapter: photocell → domain)
// ───────────────────────────────────────────────────────────────

/// Averaged capacitor charge time in seconds.  Larger means darker.
pub trait LightSensorPort {
    fn take_reading(&mut self, sample_count: u32) -> crate::error::Result<f64>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock + interruptible waits)
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Block for `duration`.  Returns [`Error::Interrupted`] as soon as a
    /// shutdown is requested.
    ///
    /// [`Error::Interrupted`]: crate::error::Error::Interrupted
    fn sleep(&mut self, duration: Duration) -> crate::error::Result<()>;
}

// ───────────────────────────────────────────────────────────────
// State store port (driven adapter: domain ↔ state record)
// ───────────────────────────────────────────────────────────────

/// Durable single-record store for the door position.
///
/// `load` never returns [`StoreError::Missing`] from a store that can
/// bootstrap: it asks the operator instead.  `save` must never leave a
/// half-written record behind.
pub trait StateStorePort {
    fn load(&mut self) -> Result<DoorRecord, StoreError>;

    fn save(&mut self, record: &DoorRecord) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Operator prompt (driven adapter: human in the loop)
// ───────────────────────────────────────────────────────────────

/// Asks the operator a question and returns the raw line they typed.
///
/// Returns `None` when the input stream is closed.
pub trait OperatorPrompt {
    fn ask(&mut self, question: &str) -> Option<String>;
}

impl<P: OperatorPrompt + ?Sized> OperatorPrompt for &mut P {
    fn ask(&mut self, question: &str) -> Option<String> {
        (**self).ask(question)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`DoorEvent`](super::events::DoorEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::DoorEvent);
}
