//! Inbound one-shot commands.
//!
//! These are the operator's manual requests from the command line, handled
//! by [`DoorService::handle_command`](super::service::DoorService::handle_command)
//! outside the scheduled control loop.

use crate::door::{Action, DoorRecord, DoorState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorCommand {
    /// Move the door unless it is already there.
    Actuate(Action),
}

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Moved(DoorRecord),
    AlreadyThere(DoorState),
}

impl CommandOutcome {
    /// The action carried out, if the door moved.
    pub fn moved(&self) -> Option<Action> {
        match self {
            Self::Moved(record) => Some(record.state.as_action()),
            _ => None,
        }
    }
}
