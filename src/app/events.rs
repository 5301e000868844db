//! Outbound application events.
//!
//! The [`DoorService`](super::service::DoorService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them; the binary only logs them.

use crate::door::{Action, DoorRecord, DoorState};
use crate::error::{SensorError, StoreError};
use crate::fsm::StateId;
use crate::trend::Trend;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum DoorEvent {
    /// The service has started (initial state and loaded door record).
    Started { state: StateId, door: DoorRecord },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A light reading entered the trend window.
    Reading {
        seconds: f64,
        window_len: usize,
        capacity: usize,
    },

    /// A reading was skipped because the sensor did not respond.
    SensorFault(SensorError),

    /// A `Deciding` tick finished.  `action` is what it chose, if anything.
    Decided {
        trend: Option<Trend>,
        action: Option<Action>,
        forced: bool,
    },

    /// The door moved and the new record was persisted.
    Actuated {
        action: Action,
        forced: bool,
        record: DoorRecord,
    },

    /// The stored record already shows the requested state; no movement.
    AlreadyInState(DoorState),

    /// The door moved but the record could not be written.
    PersistFailed { action: Action, error: StoreError },

    /// The control loop stopped on operator request.
    Stopped,
}
