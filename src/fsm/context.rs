//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard state handlers read from and write to:
//! the wall-clock time of the tick, the reading window, the in-memory door
//! record, and the decision handed to the actuator.  The
//! [`DoorService`](crate::app::service::DoorService) fills in `now` and
//! `reading` before each tick and consumes `pending` after it.

use chrono::NaiveDateTime;

use crate::config::CoopConfig;
use crate::door::{Action, DoorRecord};
use crate::schedule::ScheduleWindow;
use crate::trend::{ReadingWindow, Trend};

/// What the controller decided to do, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    /// `true` when a deadline forced the action rather than the trend.
    pub forced: bool,
}

pub struct FsmContext {
    // -- Timing --
    /// Local time of the current tick.
    pub now: NaiveDateTime,

    // -- Inputs --
    /// Reading taken for this tick, if any.  Consumed by `Sampling`.
    pub reading: Option<f64>,
    pub window: ReadingWindow,

    // -- Outputs --
    /// Trend classified by the last `Deciding` tick.
    pub last_trend: Option<Trend>,
    /// Action the `Actuating` state should carry out.
    pub pending: Option<Decision>,

    // -- Door --
    /// Last known door record.  Updated by the service after every
    /// store read and every completed drive.
    pub door: DoorRecord,

    // -- Configuration --
    pub schedule: ScheduleWindow,
}

impl FsmContext {
    pub fn new(config: &CoopConfig, door: DoorRecord) -> Self {
        Self {
            now: door.timestamp,
            reading: None,
            window: ReadingWindow::new(config.sensor.trend_len),
            last_trend: None,
            pending: None,
            door,
            schedule: ScheduleWindow::new(&config.schedule),
        }
    }
}
