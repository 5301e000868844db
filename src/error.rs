//! Unified error types for the coop door controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  Variants carry only `Copy` data so
//! they can be passed through the FSM and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The light sensor could not produce a reading.
    Sensor(SensorError),
    /// A GPIO operation failed.
    Hardware(HardwareError),
    /// The door state record could not be read or written.
    Store(StoreError),
    /// The operator asked the process to stop.
    Interrupted,
}

impl Error {
    /// Faults the control loop logs and survives.  Everything else ends
    /// the run.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Sensor(SensorError::Timeout { .. }))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Store(e) => write!(f, "state store: {e}"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
    /// The JSON config file could not be read.
    Unreadable(std::io::ErrorKind),
    /// The JSON config file did not deserialize.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Unreadable(kind) => write!(f, "config file unreadable ({kind})"),
            Self::Malformed => write!(f, "config file is not valid JSON for this schema"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The capacitor never charged past the input threshold.
    Timeout { pin: u8, waited_ms: u64 },
    /// A reading was requested with zero samples.
    NoSamples,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { pin, waited_ms } => {
                write!(f, "GPIO{pin} did not trip within {waited_ms} ms")
            }
            Self::NoSamples => write!(f, "reading requested with zero samples"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// The GPIO peripheral could not be opened.
    Unavailable,
    /// The pin does not exist or is claimed by another process.
    PinUnavailable(u8),
    /// The pin was driven or read before being configured.
    NotConfigured(u8),
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "GPIO peripheral unavailable"),
            Self::PinUnavailable(pin) => write!(f, "GPIO{pin} unavailable"),
            Self::NotConfigured(pin) => write!(f, "GPIO{pin} used before configuration"),
        }
    }
}

impl embedded_hal::digital::Error for HardwareError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl std::error::Error for HardwareError {}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// State store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No state file exists yet.
    Missing,
    /// The file exists but does not hold a usable record.
    Corrupt(&'static str),
    /// Filesystem error while reading or replacing the record.
    Io(std::io::ErrorKind),
    /// The operator prompt could not be read (stdin closed).
    PromptClosed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "state file missing"),
            Self::Corrupt(why) => write!(f, "state file corrupt: {why}"),
            Self::Io(kind) => write!(f, "I/O error ({kind})"),
            Self::PromptClosed => write!(f, "operator prompt closed before an answer"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.kind())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
