//! Unipolar stepper driver (28BYJ-48 on a ULN2003 board).
//!
//! Four driver inputs are energised in a fixed pattern; walking the pattern
//! forward turns the shaft one way, walking it backward turns it the other.
//!
//! ## Safety contract
//!
//! The driver performs no idempotency check.  The door service decides an
//! action is warranted before calling [`StepperDriver::drive`]; this driver
//! is a dumb actuator.

use std::time::Duration;

use embedded_hal::digital::PinState;
use heapless::Vec;
use log::{debug, info};

use crate::app::ports::{ClockPort, GpioPort};
use crate::config::{MotorConfig, StepMode};
use crate::door::{Action, DoorRecord};
use crate::error::Result;

/// Levels for in1..in4 at one step.
pub type StepRow = [bool; 4];

/// Manufacturer half-step sequence.
pub const HALF_STEP_SEQUENCE: [StepRow; 8] = [
    [true, false, false, true],
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
];

/// Ordered coil patterns for one electrical cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTable {
    rows: Vec<StepRow, 8>,
}

impl StepTable {
    /// Half-step: all eight rows.  Full-step: the odd-indexed rows, in order.
    pub fn build(mode: StepMode) -> Self {
        let rows = match mode {
            StepMode::Half => HALF_STEP_SEQUENCE.iter().copied().collect(),
            StepMode::Full => HALF_STEP_SEQUENCE
                .iter()
                .copied()
                .skip(1)
                .step_by(2)
                .collect(),
        };
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> StepRow {
        self.rows[index]
    }

    pub fn rows(&self) -> &[StepRow] {
        &self.rows
    }

    /// Row after `cursor` in `direction`, wrapping at both ends.
    pub fn advance(&self, cursor: usize, direction: i8) -> usize {
        let len = self.rows.len() as isize;
        (cursor as isize + isize::from(direction)).rem_euclid(len) as usize
    }
}

/// Write one row to the driver pins, in1 first.
fn write_row(gpio: &mut impl GpioPort, pins: &[u8; 4], row: StepRow) -> Result<()> {
    for (&pin, &high) in pins.iter().zip(row.iter()) {
        gpio.write(pin, PinState::from(high))?;
    }
    Ok(())
}

/// Turn the motor `step_count` steps in the direction of `action`.
///
/// The cursor starts at row 0 and wraps symmetrically: forward past the
/// last row returns to row 0, backward past row 0 returns to the last row.
/// Sleeps `delay` after every step.  Returns the record describing the
/// finished movement, stamped at completion.
pub fn drive(
    action: Action,
    table: &StepTable,
    step_count: u32,
    pins: &[u8; 4],
    delay: Duration,
    gpio: &mut impl GpioPort,
    clock: &mut impl ClockPort,
) -> Result<DoorRecord> {
    let direction = action.direction();
    let mut cursor = 0usize;

    for _ in 0..step_count {
        write_row(gpio, pins, table.row(cursor))?;
        cursor = table.advance(cursor, direction);
        clock.sleep(delay)?;
    }

    Ok(DoorRecord::new(action.resulting_state(), clock.now()))
}

/// Configured stepper: pins, table, and travel for one door movement.
pub struct StepperDriver {
    pins: [u8; 4],
    table: StepTable,
    step_count: u32,
    delay: Duration,
}

impl StepperDriver {
    pub fn new(cfg: &MotorConfig) -> Self {
        Self {
            pins: cfg.driver_pins,
            table: StepTable::build(cfg.step_mode),
            step_count: cfg.step_count(),
            delay: cfg.step_delay(),
        }
    }

    /// Claim the driver pins as outputs, coils off.
    pub fn setup(&self, gpio: &mut impl GpioPort) -> Result<()> {
        for &pin in &self.pins {
            gpio.configure_output(pin)?;
        }
        debug!("stepper: driver pins {:?} configured", self.pins);
        Ok(())
    }

    /// Run one full door movement.
    pub fn drive(
        &self,
        action: Action,
        gpio: &mut impl GpioPort,
        clock: &mut impl ClockPort,
    ) -> Result<DoorRecord> {
        info!(
            "stepper: {}, {} steps over {}-row table, {:?}/step",
            action,
            self.step_count,
            self.table.len(),
            self.delay
        );
        let record = drive(
            action,
            &self.table,
            self.step_count,
            &self.pins,
            self.delay,
            gpio,
            clock,
        )?;
        info!("stepper: {} complete", action);
        Ok(record)
    }

    /// De-energise all four coils so the motor does not sit under current.
    pub fn release_coils(&self, gpio: &mut impl GpioPort) -> Result<()> {
        write_row(gpio, &self.pins, [false; 4])
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn table(&self) -> &StepTable {
        &self.table
    }
}
