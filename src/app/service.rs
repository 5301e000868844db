//! Application service, the hexagonal core.
//!
//! [`DoorService`] owns the FSM, its context, and the stepper driver.  All
//! I/O flows through port traits injected at call sites, making the whole
//! control loop testable with mock adapters.
//!
//! ```text
//!  LightSensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!        ClockPort ──▶ │      DoorService       │
//!         GpioPort ◀── │  FSM · Schedule · Trend│ ◀─▶ StateStorePort
//!                      └────────────────────────┘
//! ```
//!
//! One [`step`](DoorService::step) performs the I/O the current state needs
//! (a reading in `Sampling`, a drive in `Actuating`), ticks the FSM, then
//! idles for the poll interval if the FSM settled in `Idle`.

use log::{error, info, warn};

use crate::config::{CoopConfig, TimingConfig};
use crate::door::DoorRecord;
use crate::drivers::stepper::StepperDriver;
use crate::error::{Error, Result};
use crate::fsm::context::{Decision, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::commands::{CommandOutcome, DoorCommand};
use super::events::DoorEvent;
use super::ports::{ClockPort, EventSink, GpioPort, LightSensorPort, StateStorePort};

// ───────────────────────────────────────────────────────────────
// DoorService
// ───────────────────────────────────────────────────────────────

pub struct DoorService {
    fsm: Fsm,
    ctx: FsmContext,
    stepper: StepperDriver,
    timing: TimingConfig,
    reading_samples: u32,
}

impl DoorService {
    /// Build the service around the door record loaded at startup.
    ///
    /// Does **not** touch any port; call [`start`](Self::start) next.
    pub fn new(config: &CoopConfig, door: DoorRecord) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(config, door),
            stepper: StepperDriver::new(&config.motor),
            timing: config.timing,
            reading_samples: config.sensor.reading_samples,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Claim the driver pins and enter `Idle`.
    pub fn start(
        &mut self,
        hw: &mut impl GpioPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.stepper.setup(hw)?;
        self.ctx.now = clock.now();
        self.fsm.start(&mut self.ctx);
        sink.emit(&DoorEvent::Started {
            state: self.fsm.current_state(),
            door: self.ctx.door,
        });
        info!("DoorService started, door {}", self.ctx.door.state);
        Ok(())
    }

    /// Run control cycles until a fatal error or shutdown.
    ///
    /// Every pin is released on the way out.  Shutdown is a clean exit.
    pub fn run(
        &mut self,
        hw: &mut (impl GpioPort + LightSensorPort),
        clock: &mut impl ClockPort,
        store: &mut impl StateStorePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let stopped = loop {
            if let Err(e) = self.step(hw, clock, store, sink) {
                break e;
            }
        };
        hw.release_all();
        match stopped {
            Error::Interrupted => {
                info!("DoorService stopped in {:?}", self.fsm.current_state());
                sink.emit(&DoorEvent::Stopped);
                Ok(())
            }
            e => {
                error!("DoorService halted: {}", e);
                Err(e)
            }
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// One control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`GpioPort`] and
    /// [`LightSensorPort`] so a single adapter owns every pin.
    pub fn step(
        &mut self,
        hw: &mut (impl GpioPort + LightSensorPort),
        clock: &mut impl ClockPort,
        store: &mut impl StateStorePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let prev = self.fsm.current_state();

        // 1. I/O for the state we are in
        match prev {
            StateId::Sampling => self.sample(hw, clock, sink)?,
            StateId::Actuating => {
                if let Some(decision) = self.ctx.pending {
                    self.actuate(decision, hw, clock, store, sink)?;
                }
            }
            StateId::Idle | StateId::Deciding => {}
        }

        // 2. FSM tick (pure state logic)
        let reading = self.ctx.reading;
        self.ctx.now = clock.now();
        self.fsm.tick(&mut self.ctx);
        let next = self.fsm.current_state();

        // 3. Events
        if let Some(seconds) = reading {
            sink.emit(&DoorEvent::Reading {
                seconds,
                window_len: self.ctx.window.len(),
                capacity: self.ctx.window.capacity(),
            });
        }
        if prev == StateId::Deciding {
            sink.emit(&DoorEvent::Decided {
                trend: self.ctx.last_trend,
                action: self.ctx.pending.map(|d| d.action),
                forced: self.ctx.pending.is_some_and(|d| d.forced),
            });
        }
        if next != prev {
            sink.emit(&DoorEvent::StateChanged {
                from: prev,
                to: next,
            });
        }

        // 4. Pace the loop
        if next == StateId::Idle {
            clock.sleep(self.timing.poll_interval())?;
        }
        Ok(())
    }

    // ── Command handling ──────────────────────────────────────

    /// Carry out a one-shot operator command.  [`start`](Self::start) must
    /// have run first.
    pub fn handle_command(
        &mut self,
        cmd: DoorCommand,
        hw: &mut impl GpioPort,
        clock: &mut impl ClockPort,
        store: &mut impl StateStorePort,
        sink: &mut impl EventSink,
    ) -> Result<CommandOutcome> {
        match cmd {
            DoorCommand::Actuate(action) => {
                let decision = Decision {
                    action,
                    forced: false,
                };
                self.actuate(decision, hw, clock, store, sink)
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Last known door record, as held in memory.
    pub fn door(&self) -> DoorRecord {
        self.ctx.door
    }

    pub fn window_len(&self) -> usize {
        self.ctx.window.len()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Take one reading for the `Sampling` tick, then wait out the reading
    /// interval.  A sensor timeout skips the reading and keeps going.
    fn sample(
        &mut self,
        hw: &mut impl LightSensorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.ctx.reading = match hw.take_reading(self.reading_samples) {
            Ok(seconds) => Some(seconds),
            Err(Error::Sensor(e)) if Error::Sensor(e).is_retryable() => {
                warn!("Reading skipped: {}", e);
                sink.emit(&DoorEvent::SensorFault(e));
                None
            }
            Err(e) => return Err(e),
        };
        clock.sleep(self.timing.reading_interval())
    }

    /// Move the door if the stored record says it is not already there.
    ///
    /// The coils are de-energised whether or not the drive finished.  An
    /// interrupted drive is abandoned without touching the record.
    fn actuate(
        &mut self,
        decision: Decision,
        hw: &mut impl GpioPort,
        clock: &mut impl ClockPort,
        store: &mut impl StateStorePort,
        sink: &mut impl EventSink,
    ) -> Result<CommandOutcome> {
        let action = decision.action;
        let stored = store.load()?;
        self.ctx.door = stored;
        if stored.state.already(action) {
            info!("Door already {}", action.past_tense());
            sink.emit(&DoorEvent::AlreadyInState(stored.state));
            return Ok(CommandOutcome::AlreadyThere(stored.state));
        }

        let driven = self.stepper.drive(action, hw, clock);
        let released = self.stepper.release_coils(hw);
        let record = driven?;
        released?;

        self.ctx.door = record;
        if let Err(e) = store.save(&record) {
            error!("Door {} but the record was not saved: {}", action.past_tense(), e);
            sink.emit(&DoorEvent::PersistFailed { action, error: e });
            return Err(e.into());
        }

        sink.emit(&DoorEvent::Actuated {
            action,
            forced: decision.forced,
            record,
        });
        Ok(CommandOutcome::Moved(record))
    }
}
