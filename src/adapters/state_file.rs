//! Door state file adapter.
//!
//! Implements [`StateStorePort`] over a small text file:
//!
//! ```text
//! door_state: open
//! time: 12/01/2020, 06:15:03
//! ```
//!
//! # Durability
//!
//! - Writes go to a temporary file in the same directory, which is then
//!   renamed over the record.  A crash mid-write leaves the previous record.
//! - A missing or unreadable record is rebuilt by asking the operator where
//!   the door is, and the answer is persisted immediately.
//! - Keys other than `door_state` and `time` are ignored.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use tempfile::NamedTempFile;

use crate::app::ports::{OperatorPrompt, StateStorePort};
use crate::door::{DoorRecord, DoorState};
use crate::error::StoreError;

/// Timestamp layout of the `time:` line, local time.
pub const TIME_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

const STATE_KEY: &str = "door_state";
const TIME_KEY: &str = "time";

pub const BOOTSTRAP_QUESTION: &str = "Is the door currently open? [y/n]";

/// Render a record in the state file format.
pub fn format_record(record: &DoorRecord) -> String {
    let state = match record.state {
        DoorState::Open => "open",
        DoorState::Closed => "close",
    };
    format!(
        "{STATE_KEY}: {state}\n{TIME_KEY}: {}\n",
        record.timestamp.format(TIME_FORMAT)
    )
}

/// Parse the state file format.  Both keys are required.
pub fn parse_record(text: &str) -> Result<DoorRecord, StoreError> {
    let mut state = None;
    let mut timestamp = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            STATE_KEY => {
                state = Some(match value {
                    "open" => DoorState::Open,
                    "close" | "closed" => DoorState::Closed,
                    _ => return Err(StoreError::Corrupt("unknown door_state value")),
                });
            }
            TIME_KEY => {
                let ts = NaiveDateTime::parse_from_str(value, TIME_FORMAT)
                    .map_err(|_| StoreError::Corrupt("unparseable time"))?;
                timestamp = Some(ts);
            }
            _ => {}
        }
    }

    match (state, timestamp) {
        (Some(state), Some(timestamp)) => Ok(DoorRecord::new(state, timestamp)),
        (None, _) => Err(StoreError::Corrupt("door_state missing")),
        (_, None) => Err(StoreError::Corrupt("time missing")),
    }
}

/// Interpret an operator answer.  `None` means ask again.
fn parse_answer(answer: &str) -> Option<DoorState> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(DoorState::Open),
        "n" | "no" => Some(DoorState::Closed),
        _ => None,
    }
}

/// Source of the timestamp stamped on a bootstrapped record.
pub type TimestampFn = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// File-backed door state store with interactive bootstrap.
pub struct FileStateStore<P: OperatorPrompt> {
    path: PathBuf,
    prompt: P,
    clock: TimestampFn,
}

impl<P: OperatorPrompt> FileStateStore<P> {
    /// Store at `path`, stamping bootstrapped records with local time.
    pub fn new(path: impl Into<PathBuf>, prompt: P) -> Self {
        Self {
            path: path.into(),
            prompt,
            clock: local_now,
        }
    }

    /// Replace the wall clock used for bootstrapped records.
    pub fn with_clock(mut self, clock: TimestampFn) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record as stored, without bootstrapping.
    pub fn read(&self) -> Result<DoorRecord, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_record(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::Missing),
            Err(e) => Err(e.into()),
        }
    }

    /// Ask the operator until they give a yes/no answer.
    fn bootstrap(&mut self) -> Result<DoorRecord, StoreError> {
        let state = loop {
            let answer = self.prompt.ask(BOOTSTRAP_QUESTION).ok_or(StoreError::PromptClosed)?;
            if let Some(state) = parse_answer(&answer) {
                break state;
            }
            warn!("state: answer {:?} not understood, expected y or n", answer.trim());
        };
        let record = DoorRecord::new(state, (self.clock)());
        info!("state: operator reports door {}", state);
        self.save(&record)?;
        Ok(record)
    }
}

impl<P: OperatorPrompt> StateStorePort for FileStateStore<P> {
    fn load(&mut self) -> Result<DoorRecord, StoreError> {
        match self.read() {
            Ok(record) => Ok(record),
            Err(StoreError::Missing) => {
                info!("state: no record at {}, asking operator", self.path.display());
                self.bootstrap()
            }
            Err(StoreError::Corrupt(why)) => {
                warn!("state: record at {} is corrupt ({}), asking operator", self.path.display(), why);
                self.bootstrap()
            }
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, record: &DoorRecord) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(format_record(record).as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::from(e.error))?;
        Ok(())
    }
}
