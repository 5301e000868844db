//! Time-of-day gating for door actions.
//!
//! ```text
//!  00:00        open_check    open_frame          close_check   close_frame         24:00
//!    │ ─ ─ ─ ─ ─ [eo-2:30, lo-2:30] [eo, lo] ─ ─ ─ ─ [ec-2:30, lc-2:30] [ec, lc] ─ ─ ─ │
//!    │◀── close deadline ──▶│                                                │◀── close deadline
//!                            lo ◀────────── open deadline ──────────▶ ec
//! ```
//!
//! * **check windows** start sampling early so the trend window is full by
//!   the time the action frame opens.
//! * **action frames** are the only times a trend-driven action is allowed.
//! * **deadlines** force the door into the right state once the late bound
//!   passes without the trend ever confirming it.
//!
//! Every interval may wrap past midnight.

use chrono::{NaiveTime, TimeDelta};

use crate::config::ScheduleConfig;
use crate::door::{Action, DoorRecord};

/// How far ahead of each action frame sampling starts.
pub const CHECK_LEAD: TimeDelta = TimeDelta::minutes(150);

/// Closed interval of local time-of-day that may wrap past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether `now` falls inside the window, bounds included.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.start < self.end {
            self.start <= now && now <= self.end
        } else {
            // Wraps midnight.  A window with start == end covers the whole day.
            now >= self.start || now <= self.end
        }
    }

    /// The same window moved earlier by `lead`, wrapping at midnight.
    pub fn shifted_back(&self, lead: TimeDelta) -> Self {
        Self {
            start: self.start - lead,
            end: self.end - lead,
        }
    }

    /// Inside the window, both bounds excluded.
    fn contains_strictly(&self, now: NaiveTime) -> bool {
        now != self.start && now != self.end && self.contains(now)
    }
}

fn hour(h: u8) -> NaiveTime {
    NaiveTime::from_hms_opt(u32::from(h % 24), 0, 0).unwrap_or_default()
}

/// Derived windows for one day, built once from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub open_frame: TimeWindow,
    pub close_frame: TimeWindow,
    pub open_check: TimeWindow,
    pub close_check: TimeWindow,
    /// After this the door must be open (until the close frame begins).
    pub open_limit: NaiveTime,
    /// After this the door must be closed (until the open frame begins).
    pub close_limit: NaiveTime,
}

impl ScheduleWindow {
    pub fn new(cfg: &ScheduleConfig) -> Self {
        let open_frame = TimeWindow::new(hour(cfg.early_open), hour(cfg.late_open));
        let close_frame = TimeWindow::new(hour(cfg.early_close), hour(cfg.late_close));
        Self {
            open_frame,
            close_frame,
            open_check: open_frame.shifted_back(CHECK_LEAD),
            close_check: close_frame.shifted_back(CHECK_LEAD),
            open_limit: open_frame.end,
            close_limit: close_frame.end,
        }
    }

    /// True inside either pre-action check window.
    pub fn time_to_check(&self, now: NaiveTime) -> bool {
        self.open_check.contains(now) || self.close_check.contains(now)
    }

    /// True inside either action frame.
    pub fn in_frame(&self, now: NaiveTime) -> bool {
        self.open_frame.contains(now) || self.close_frame.contains(now)
    }

    /// Whether the controller should be collecting readings: from the start
    /// of a check window through the end of its action frame.
    pub fn should_sample(&self, now: NaiveTime) -> bool {
        self.time_to_check(now) || self.in_frame(now)
    }

    /// The action the current frame allows, unless the door is already there.
    pub fn permitted_action(&self, now: NaiveTime, current: &DoorRecord) -> Option<Action> {
        let frame_action = if self.open_frame.contains(now) {
            Some(Action::Open)
        } else if self.close_frame.contains(now) {
            Some(Action::Close)
        } else {
            None
        };
        frame_action.filter(|&a| !current.state.already(a))
    }

    /// A deadline-forced action, independent of the light trend.
    ///
    /// "Past the open limit" runs from `late_open` to the start of the close
    /// frame; "past the close limit" runs from `late_close` to the start of
    /// the open frame.  Both bounds are excluded, so the spans never touch a
    /// frame and at most one fires.
    pub fn limit_action(&self, now: NaiveTime, current: &DoorRecord) -> Option<Action> {
        let open_deadline = TimeWindow::new(self.open_limit, self.close_frame.start);
        let close_deadline = TimeWindow::new(self.close_limit, self.open_frame.start);

        if open_deadline.contains_strictly(now) && !current.state.already(Action::Open) {
            return Some(Action::Open);
        }
        if close_deadline.contains_strictly(now) && !current.state.already(Action::Close) {
            return Some(Action::Close);
        }
        None
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
