//! Integration tests for the DoorService → FSM → stepper pipeline.
//!
//! A simulated clock drives the schedule; scripted light readings drive
//! the trend; a recording GPIO captures every coil pattern.

use coopdoor::app::commands::{CommandOutcome, DoorCommand};
use coopdoor::app::events::DoorEvent;
use coopdoor::app::service::DoorService;
use coopdoor::config::CoopConfig;
use coopdoor::door::{Action, DoorRecord, DoorState};
use coopdoor::drivers::stepper::HALF_STEP_SEQUENCE;
use coopdoor::error::{Error, SensorError, StoreError};
use coopdoor::fsm::StateId;
use embedded_hal::digital::PinState;

use crate::mock_hw::{FakeClock, GpioCall, MemoryStore, MockHardware, RecordingSink, timestamp};

const PINS: [u8; 4] = [17, 22, 23, 24];

/// Defaults with an eight-step door so drives are easy to inspect.
fn config() -> CoopConfig {
    let mut cfg = CoopConfig::default();
    cfg.motor.revolutions = 8.0 / 4096.0;
    cfg
}

fn started(
    door: DoorState,
    clock: &FakeClock,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
) -> DoorService {
    let mut svc = DoorService::new(&config(), DoorRecord::new(door, timestamp(0, 0)));
    svc.start(hw, clock, sink).unwrap();
    svc
}

/// Step until the door record changes state or `max` steps pass.
fn step_until_moved(
    svc: &mut DoorService,
    hw: &mut MockHardware,
    clock: &mut FakeClock,
    store: &mut MemoryStore,
    sink: &mut RecordingSink,
    max: usize,
) -> usize {
    let initial = svc.door().state;
    for n in 1..=max {
        svc.step(hw, clock, store, sink).unwrap();
        if svc.door().state != initial {
            return n;
        }
    }
    panic!("door never moved in {max} steps");
}

fn driver_writes(hw: &MockHardware) -> usize {
    hw.calls
        .iter()
        .filter(|c| matches!(c, GpioCall::Write(pin, _) if PINS.contains(pin)))
        .count()
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_claims_driver_pins_and_reports() {
    let clock = FakeClock::at(12, 0);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    assert_eq!(svc.state(), StateId::Idle);
    for pin in PINS {
        assert!(hw.calls.contains(&GpioCall::ConfigureOutput(pin)));
    }
    assert!(matches!(
        sink.events[0],
        DoorEvent::Started {
            state: StateId::Idle,
            ..
        }
    ));
}

// ── Trend-driven actuation ───────────────────────────────────

#[test]
fn rising_trend_opens_door_inside_open_frame() {
    let mut clock = FakeClock::at(5, 0);
    let mut hw = MockHardware::with_readings(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let mut store = MemoryStore::holding(DoorState::Closed);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    step_until_moved(&mut svc, &mut hw, &mut clock, &mut store, &mut sink, 40);

    assert_eq!(svc.door().state, DoorState::Open);
    assert_eq!(store.saves.len(), 1);
    assert_eq!(store.saves[0].state, DoorState::Open);
    // Eight forward rows, then coils off.
    let mut expected = HALF_STEP_SEQUENCE.to_vec();
    expected.push([false; 4]);
    assert_eq!(hw.rows_written(&PINS), expected);
    assert!(sink.contains(|e| matches!(
        e,
        DoorEvent::Actuated {
            action: Action::Open,
            forced: false,
            ..
        }
    )));
    // The record carries the completion time, inside the open frame.
    let t = store.saves[0].timestamp;
    assert!(t > timestamp(6, 0) && t < timestamp(7, 0), "stamped at {t}");
}

#[test]
fn falling_trend_closes_door_inside_close_frame() {
    let mut clock = FakeClock::at(17, 0);
    let mut hw = MockHardware::with_readings(&[5.0, 4.0, 3.0, 2.0, 1.0]);
    let mut store = MemoryStore::holding(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    step_until_moved(&mut svc, &mut hw, &mut clock, &mut store, &mut sink, 40);

    assert_eq!(store.record.unwrap().state, DoorState::Closed);
    let rows = hw.rows_written(&PINS);
    let expected: Vec<[bool; 4]> = [0, 7, 6, 5, 4, 3, 2, 1]
        .iter()
        .map(|&i| HALF_STEP_SEQUENCE[i])
        .collect();
    assert_eq!(&rows[..8], expected.as_slice());
}

#[test]
fn sampling_runs_on_reading_interval() {
    let mut clock = FakeClock::at(3, 0);
    let mut hw = MockHardware::with_readings(&[3.0]);
    let mut store = MemoryStore::holding(DoorState::Closed);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    assert_eq!(svc.state(), StateId::Sampling);
    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    assert_eq!(svc.state(), StateId::Deciding);
    assert_eq!(svc.window_len(), 1);
    assert_eq!(clock.now, timestamp(3, 15));
    assert!(sink.contains(|e| matches!(
        e,
        DoorEvent::Reading {
            window_len: 1,
            capacity: 5,
            ..
        }
    )));

    // Partial window: no decision, back to idle for one poll interval.
    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(clock.now, timestamp(3, 16));
}

#[test]
fn mixed_trend_never_moves_door() {
    let mut clock = FakeClock::at(5, 0);
    let mut hw = MockHardware::with_readings(&[1.0, 3.0, 2.0, 4.0, 1.0, 3.0, 2.0]);
    let mut store = MemoryStore::holding(DoorState::Closed);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    for _ in 0..21 {
        svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    }
    assert!(clock.now < timestamp(7, 0));
    assert_eq!(driver_writes(&hw), 0);
    assert!(store.saves.is_empty());
}

// ── Idempotence ──────────────────────────────────────────────

#[test]
fn agreeing_trend_does_nothing_when_already_open() {
    let mut clock = FakeClock::at(5, 0);
    let mut hw = MockHardware::with_readings(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    let mut store = MemoryStore::holding(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    for _ in 0..21 {
        svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    }
    assert_eq!(driver_writes(&hw), 0);
    assert!(store.saves.is_empty());
}

#[test]
fn actuation_rechecks_stored_state() {
    // The in-memory record is stale: someone opened the door by hand.
    let mut clock = FakeClock::at(12, 0);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    // Idle sees the stale Closed record past the open limit.
    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    assert_eq!(svc.state(), StateId::Actuating);
    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();

    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(store.loads, 1);
    assert_eq!(driver_writes(&hw), 0);
    assert_eq!(svc.door().state, DoorState::Open);
    assert!(sink.contains(|e| *e == DoorEvent::AlreadyInState(DoorState::Open)));
}

// ── Deadlines ────────────────────────────────────────────────

#[test]
fn close_limit_forces_close_without_trend() {
    let mut clock = FakeClock::at(20, 1);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    let steps = step_until_moved(&mut svc, &mut hw, &mut clock, &mut store, &mut sink, 3);

    assert_eq!(steps, 2);
    assert_eq!(store.record.unwrap().state, DoorState::Closed);
    assert!(sink.contains(|e| matches!(
        e,
        DoorEvent::Actuated {
            action: Action::Close,
            forced: true,
            ..
        }
    )));
}

#[test]
fn open_limit_forces_open_after_late_open() {
    let mut clock = FakeClock::at(7, 30);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Closed);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    step_until_moved(&mut svc, &mut hw, &mut clock, &mut store, &mut sink, 3);
    assert_eq!(store.record.unwrap().state, DoorState::Open);
}

#[test]
fn quiet_midday_only_polls() {
    let mut clock = FakeClock::at(11, 0);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    for _ in 0..5 {
        svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
        assert_eq!(svc.state(), StateId::Idle);
    }
    assert_eq!(clock.now, timestamp(11, 5));
    assert_eq!(store.loads, 0);
}

// ── Faults ───────────────────────────────────────────────────

#[test]
fn sensor_timeout_skips_reading_and_continues() {
    let mut clock = FakeClock::at(3, 0);
    let mut hw = MockHardware::new();
    let timeout = SensorError::Timeout {
        pin: 26,
        waited_ms: 5000,
    };
    hw.readings.push_back(Err(timeout.into()));
    let mut store = MemoryStore::holding(DoorState::Closed);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();

    assert_eq!(svc.state(), StateId::Deciding);
    assert_eq!(svc.window_len(), 0);
    assert!(sink.contains(|e| *e == DoorEvent::SensorFault(timeout)));
}

#[test]
fn persist_failure_keeps_new_state_in_memory() {
    let mut clock = FakeClock::at(20, 1);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::failing(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap();
    let err = svc.step(&mut hw, &mut clock, &mut store, &mut sink).unwrap_err();

    assert_eq!(err, Error::Store(StoreError::Io(std::io::ErrorKind::PermissionDenied)));
    assert_eq!(svc.door().state, DoorState::Closed);
    assert!(sink.contains(|e| matches!(
        e,
        DoorEvent::PersistFailed {
            action: Action::Close,
            ..
        }
    )));
    // The motor still finished and the coils were released.
    assert_eq!(hw.rows_written(&PINS).last(), Some(&[false; 4]));
}

// ── Shutdown ─────────────────────────────────────────────────

#[test]
fn interrupt_ends_run_cleanly_and_releases_pins() {
    let mut clock = FakeClock::at(12, 0).interrupting_after(2);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    assert_eq!(svc.run(&mut hw, &mut clock, &mut store, &mut sink), Ok(()));
    assert_eq!(hw.calls.last(), Some(&GpioCall::ReleaseAll));
    assert_eq!(sink.events.last(), Some(&DoorEvent::Stopped));
}

#[test]
fn interrupted_drive_is_abandoned_without_saving() {
    // Four step delays, then the interrupt.
    let mut clock = FakeClock::at(20, 1).interrupting_after(4);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    assert_eq!(svc.run(&mut hw, &mut clock, &mut store, &mut sink), Ok(()));

    assert!(store.saves.is_empty());
    assert_eq!(store.record.unwrap().state, DoorState::Open);
    let rows = hw.rows_written(&PINS);
    assert_eq!(rows.last(), Some(&[false; 4]), "coils left energised");
    assert!(hw.released());
    assert!(!sink.contains(|e| matches!(e, DoorEvent::Actuated { .. })));
}

#[test]
fn fatal_error_ends_run_with_error() {
    let mut clock = FakeClock::at(20, 1);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::failing(DoorState::Open);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Open, &clock, &mut hw, &mut sink);

    let result = svc.run(&mut hw, &mut clock, &mut store, &mut sink);
    assert!(matches!(result, Err(Error::Store(_))));
    assert!(hw.released());
}

// ── Manual commands ──────────────────────────────────────────

#[test]
fn manual_open_moves_closed_door() {
    let mut clock = FakeClock::at(12, 0);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Closed);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    let outcome = svc
        .handle_command(DoorCommand::Actuate(Action::Open), &mut hw, &mut clock, &mut store, &mut sink)
        .unwrap();
    assert_eq!(outcome.moved(), Some(Action::Open));
    assert_eq!(store.record.unwrap().state, DoorState::Open);
}

#[test]
fn manual_command_is_idempotent() {
    let mut clock = FakeClock::at(12, 0);
    let mut hw = MockHardware::new();
    let mut store = MemoryStore::holding(DoorState::Closed);
    let mut sink = RecordingSink::new();
    let mut svc = started(DoorState::Closed, &clock, &mut hw, &mut sink);

    let outcome = svc
        .handle_command(DoorCommand::Actuate(Action::Close), &mut hw, &mut clock, &mut store, &mut sink)
        .unwrap();
    assert_eq!(outcome, CommandOutcome::AlreadyThere(DoorState::Closed));
    assert_eq!(driver_writes(&hw), 0);
    assert!(!hw.calls.iter().any(|c| matches!(c, GpioCall::Write(_, PinState::High))));
}
