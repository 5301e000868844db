//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by rendering each [`DoorEvent`] as one log line.
//! The binary routes `log` records through `tracing-subscriber`.

use log::{debug, error, info, warn};

use crate::app::events::DoorEvent;
use crate::app::ports::EventSink;
use crate::door::DoorRecord;

const TIME_FORMAT: &str = crate::adapters::state_file::TIME_FORMAT;

fn stamp(record: &DoorRecord) -> impl core::fmt::Display + '_ {
    record.timestamp.format(TIME_FORMAT)
}

/// Adapter that logs every [`DoorEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DoorEvent) {
        match event {
            DoorEvent::Started { state, door } => {
                info!("START | state={:?} | door={} since {}", state, door.state, stamp(door));
            }
            DoorEvent::StateChanged { from, to } => {
                debug!("STATE | {:?} -> {:?}", from, to);
            }
            DoorEvent::Reading {
                seconds,
                window_len,
                capacity,
            } => {
                info!("READING | {:.6}s | window {}/{}", seconds, window_len, capacity);
            }
            DoorEvent::SensorFault(e) => {
                warn!("READING | skipped: {}", e);
            }
            DoorEvent::Decided {
                trend,
                action,
                forced,
            } => match action {
                Some(a) => info!(
                    "DECIDE | trend={:?} | {} ({})",
                    trend,
                    a,
                    if *forced { "deadline" } else { "trend" }
                ),
                None => debug!("DECIDE | trend={:?} | no action", trend),
            },
            DoorEvent::Actuated {
                action,
                forced,
                record,
            } => {
                info!(
                    "DOOR | {} at {}{}",
                    action.past_tense(),
                    stamp(record),
                    if *forced { " (deadline)" } else { "" }
                );
            }
            DoorEvent::AlreadyInState(state) => {
                info!("DOOR | already {}", state);
            }
            DoorEvent::PersistFailed { action, error: e } => {
                error!("DOOR | {} but state not saved: {}", action.past_tense(), e);
            }
            DoorEvent::Stopped => {
                info!("STOP | control loop stopped");
            }
        }
    }
}
