//! Door domain types: the requested action and the persisted state.

use core::fmt;

use chrono::NaiveDateTime;

/// A movement the controller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Open,
    Close,
}

impl Action {
    /// Stepper direction: forward for open, reverse for close.
    pub fn direction(self) -> i8 {
        match self {
            Self::Open => 1,
            Self::Close => -1,
        }
    }

    /// State the door is in once this action completes.
    pub fn resulting_state(self) -> DoorState {
        match self {
            Self::Open => DoorState::Open,
            Self::Close => DoorState::Closed,
        }
    }

    /// Past tense for operator messages ("opened", "closed").
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Open => "opened",
            Self::Close => "closed",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// Physical door position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    /// The action that would leave the door in this state.
    pub fn as_action(self) -> Action {
        match self {
            Self::Open => Action::Open,
            Self::Closed => Action::Close,
        }
    }

    /// Whether `action` would leave the door where it already is.
    pub fn already(self, action: Action) -> bool {
        self.as_action() == action
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// The single ground-truth record: where the door is and when it got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorRecord {
    pub state: DoorState,
    /// Local wall-clock time the last movement finished (or the operator
    /// answered the bootstrap prompt).
    pub timestamp: NaiveDateTime,
}

impl DoorRecord {
    pub fn new(state: DoorState, timestamp: NaiveDateTime) -> Self {
        Self { state, timestamp }
    }
}
