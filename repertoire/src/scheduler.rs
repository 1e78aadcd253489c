//! Leitner-style spaced repetition.
//!
//! Every position sits in a box `0..=MAX_BOX`. A correct answer moves it one
//! box up, a wrong answer one box down. Higher boxes are reviewed less often:
//!
//! | box | interval |
//! |-----|----------|
//! | 0   | 1 day    |
//! | 1   | 3 days   |
//! | 2   | 1 week   |
//! | 3   | 3 weeks  |
//!
//! The interval applied after a correct answer is the one of the box the
//! position was in when it was answered. A wrong answer is retried after
//! [`RETRY_INTERVAL`]. All functions here are pure; the caller supplies `now`.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Timestamp;

/// Highest Leitner box.
pub const MAX_BOX: u8 = 3;

pub const DAY_SECS: u64 = 24 * 60 * 60;

/// Delay before a wrongly answered position is due again.
pub const RETRY_INTERVAL: u64 = DAY_SECS;

/// Review interval in seconds for a position answered from `box_index`.
pub fn interval(box_index: u8) -> u64 {
    match box_index.min(MAX_BOX) {
        0 => DAY_SECS,
        1 => 3 * DAY_SECS,
        2 => 7 * DAY_SECS,
        _ => 21 * DAY_SECS,
    }
}

/// Get the current unix timestamp in seconds.
pub fn now_timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Spaced-repetition state of a single position.
///
/// `due == None` means the position was never scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleState {
    pub box_index: u8,
    pub due: Option<Timestamp>,
    pub last_reviewed: Option<Timestamp>,
}

/// Result of checking the player's move against the recorded ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Correct,
    Incorrect,
}

/// How a quiz attempt updates the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMode {
    /// Move the box up or down, leave the due date alone.
    AdjustBox,
    /// Move the box and compute a new due date.
    Reschedule,
}

impl ScheduleState {
    pub fn is_due(&self, as_of: Timestamp) -> bool {
        self.due.is_some_and(|due| due <= as_of)
    }

    /// Position must be rehearsed immediately (after it gained a new move).
    pub fn reset(self, now: Timestamp) -> Self {
        Self {
            box_index: 0,
            due: Some(now),
            ..self
        }
    }

    pub fn promoted(self) -> Self {
        Self {
            box_index: self.box_index.saturating_add(1).min(MAX_BOX),
            ..self
        }
    }

    pub fn demoted(self) -> Self {
        Self {
            box_index: self.box_index.saturating_sub(1),
            ..self
        }
    }

    /// Apply a quiz attempt made at `now`.
    pub fn review(self, answer: Answer, mode: ReviewMode, now: Timestamp) -> Self {
        let mut next = match answer {
            Answer::Correct => self.promoted(),
            Answer::Incorrect => self.demoted(),
        };

        if mode == ReviewMode::Reschedule {
            let delay = match answer {
                Answer::Correct => interval(self.box_index),
                Answer::Incorrect => RETRY_INTERVAL,
            };
            next.due = Some(now.saturating_add(delay));
        }

        next.last_reviewed = Some(now);
        next
    }
}
