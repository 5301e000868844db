//! Mock adapters for integration tests.
//!
//! Records every pin call so tests can assert on the full command history
//! without touching a real GPIO header.  The clock is simulated: sleeping
//! advances it instantly.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use coopdoor::app::events::DoorEvent;
use coopdoor::app::ports::{
    ClockPort, EventSink, GpioPort, LightSensorPort, OperatorPrompt, StateStorePort,
};
use coopdoor::door::{DoorRecord, DoorState};
use coopdoor::error::{Error, HardwareError, Result, StoreError};
use embedded_hal::digital::PinState;

// ── Pin call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    ConfigureOutput(u8),
    ConfigureInput(u8),
    Write(u8, PinState),
    Read(u8),
    ReleaseAll,
}

// ── MockHardware ──────────────────────────────────────────────

/// Recording GPIO plus a scripted light sensor.
pub struct MockHardware {
    pub calls: Vec<GpioCall>,
    pub readings: VecDeque<Result<f64>>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            readings: VecDeque::new(),
        }
    }

    pub fn with_readings(readings: &[f64]) -> Self {
        let mut hw = Self::new();
        hw.readings = readings.iter().map(|&r| Ok(r)).collect();
        hw
    }

    /// Levels written to `pins`, grouped into one row per full pass over
    /// the four pins in order.
    pub fn rows_written(&self, pins: &[u8; 4]) -> Vec<[bool; 4]> {
        let writes: Vec<(u8, PinState)> = self
            .calls
            .iter()
            .filter_map(|c| match *c {
                GpioCall::Write(pin, level) if pins.contains(&pin) => Some((pin, level)),
                _ => None,
            })
            .collect();
        writes
            .chunks(4)
            .map(|chunk| {
                let mut row = [false; 4];
                for (i, &(pin, level)) in chunk.iter().enumerate() {
                    assert_eq!(pin, pins[i], "driver pins written out of order");
                    row[i] = level == PinState::High;
                }
                row
            })
            .collect()
    }

    pub fn released(&self) -> bool {
        self.calls.contains(&GpioCall::ReleaseAll)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for MockHardware {
    fn configure_output(&mut self, pin: u8) -> core::result::Result<(), HardwareError> {
        self.calls.push(GpioCall::ConfigureOutput(pin));
        Ok(())
    }

    fn configure_input(&mut self, pin: u8) -> core::result::Result<(), HardwareError> {
        self.calls.push(GpioCall::ConfigureInput(pin));
        Ok(())
    }

    fn write(&mut self, pin: u8, level: PinState) -> core::result::Result<(), HardwareError> {
        self.calls.push(GpioCall::Write(pin, level));
        Ok(())
    }

    fn read(&mut self, pin: u8) -> core::result::Result<PinState, HardwareError> {
        self.calls.push(GpioCall::Read(pin));
        Ok(PinState::High)
    }

    fn release_all(&mut self) {
        self.calls.push(GpioCall::ReleaseAll);
    }
}

impl LightSensorPort for MockHardware {
    fn take_reading(&mut self, _sample_count: u32) -> Result<f64> {
        self.readings.pop_front().unwrap_or(Ok(1.0))
    }
}

// ── FakeClock ─────────────────────────────────────────────────

/// Simulated wall clock.  Every sleep advances `now` by its duration.
pub struct FakeClock {
    pub now: NaiveDateTime,
    pub sleeps: Vec<Duration>,
    /// Fail every sleep after this many have completed.
    pub interrupt_after: Option<usize>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn at(h: u32, m: u32) -> Self {
        Self {
            now: timestamp(h, m),
            sleeps: Vec::new(),
            interrupt_after: None,
        }
    }

    pub fn interrupting_after(mut self, sleeps: usize) -> Self {
        self.interrupt_after = Some(sleeps);
        self
    }
}

impl ClockPort for FakeClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn sleep(&mut self, duration: Duration) -> Result<()> {
        if self.interrupt_after.is_some_and(|n| self.sleeps.len() >= n) {
            return Err(Error::Interrupted);
        }
        self.sleeps.push(duration);
        self.now += TimeDelta::from_std(duration).unwrap();
        Ok(())
    }
}

/// 2020-12-01 at `h:m`.
pub fn timestamp(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 12, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

// ── MemoryStore ───────────────────────────────────────────────

/// In-memory state store.  `fail_saves` makes every write fail.
pub struct MemoryStore {
    pub record: Option<DoorRecord>,
    pub saves: Vec<DoorRecord>,
    pub loads: usize,
    pub fail_saves: bool,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn holding(state: DoorState) -> Self {
        Self {
            record: Some(DoorRecord::new(state, timestamp(0, 0))),
            saves: Vec::new(),
            loads: 0,
            fail_saves: false,
        }
    }

    pub fn failing(state: DoorState) -> Self {
        Self {
            fail_saves: true,
            ..Self::holding(state)
        }
    }
}

impl StateStorePort for MemoryStore {
    fn load(&mut self) -> core::result::Result<DoorRecord, StoreError> {
        self.loads += 1;
        self.record.ok_or(StoreError::Missing)
    }

    fn save(&mut self, record: &DoorRecord) -> core::result::Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Io(std::io::ErrorKind::PermissionDenied));
        }
        self.saves.push(*record);
        self.record = Some(*record);
        Ok(())
    }
}

// ── ScriptedPrompt ────────────────────────────────────────────

/// Answers questions from a fixed script; `None` once exhausted.
pub struct ScriptedPrompt {
    pub answers: VecDeque<String>,
    pub asked: Vec<String>,
}

#[allow(dead_code)]
impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| format!("{a}\n")).collect(),
            asked: Vec::new(),
        }
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<DoorEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, pred: impl Fn(&DoorEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &DoorEvent) {
        self.events.push(event.clone());
    }
}
