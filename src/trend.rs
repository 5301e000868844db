//! Light-trend classification over a rolling window of RC readings.
//!
//! A reading is the averaged capacitor charge time in seconds: larger means
//! darker.  The window keeps the last `trend_len` readings in arrival order
//! and the classifier walks it pairwise.

use heapless::Deque;

use crate::door::Action;

/// Upper bound on `trend_len`; the window is stack-allocated at this size.
pub const MAX_TREND_LEN: usize = 32;

/// Direction of the readings across a full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// No reading rose above its predecessor (ties included).
    AllNonIncreasing,
    /// Every reading rose above its predecessor.
    AllNonDecreasing,
    Mixed,
}

impl Trend {
    /// Door action this trend votes for.
    ///
    /// Non-increasing charge times vote "close" and rising ones vote "open".
    /// This is the mapping the deployed controller has always used; do not
    /// flip it without field data.
    pub fn candidate_action(self) -> Option<Action> {
        match self {
            Self::AllNonIncreasing => Some(Action::Close),
            Self::AllNonDecreasing => Some(Action::Open),
            Self::Mixed => None,
        }
    }
}

/// Classify an ordered sequence of readings, oldest first.
///
/// Sequences shorter than two readings have no pairs and classify as
/// `AllNonIncreasing`; callers only classify full windows.
pub fn classify(readings: impl IntoIterator<Item = f64>) -> Trend {
    let mut iter = readings.into_iter();
    let Some(mut prev) = iter.next() else {
        return Trend::AllNonIncreasing;
    };

    let mut increase = 0u32;
    let mut decrease = 0u32;
    for value in iter {
        if value > prev {
            increase += 1;
        } else {
            decrease += 1;
        }
        prev = value;
    }

    if increase == 0 {
        Trend::AllNonIncreasing
    } else if decrease == 0 {
        Trend::AllNonDecreasing
    } else {
        Trend::Mixed
    }
}

/// FIFO of the most recent readings with a runtime capacity.
#[derive(Debug, Clone)]
pub struct ReadingWindow {
    readings: Deque<f64, MAX_TREND_LEN>,
    capacity: usize,
}

impl ReadingWindow {
    /// `capacity` is clamped into `2..=MAX_TREND_LEN`; config validation
    /// rejects anything outside that range before we get here.
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: Deque::new(),
            capacity: capacity.clamp(2, MAX_TREND_LEN),
        }
    }

    /// Append a reading, evicting the oldest once full.
    pub fn push(&mut self, reading: f64) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        // Cannot fail: length is below capacity <= MAX_TREND_LEN here.
        let _ = self.readings.push_back(reading);
    }

    pub fn is_full(&self) -> bool {
        self.readings.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Readings oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().copied()
    }

    /// Trend of a full window; `None` while still filling.
    pub fn trend(&self) -> Option<Trend> {
        self.is_full().then(|| classify(self.iter()))
    }
}
