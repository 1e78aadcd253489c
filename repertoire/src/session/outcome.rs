use serde::Serialize;

use crate::scheduler::ScheduleState;

/// Result of a quiz attempt at the cursor position.
///
/// A wrong answer is an expected outcome and carries what should have been
/// played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum QuizOutcome {
    Correct {
        /// Recorded move that matched the answer.
        played: String,
        /// Position the cursor advanced to.
        position: String,
        schedule: ScheduleState,
    },
    Incorrect {
        played: String,
        /// Every move recorded from the quizzed position.
        expected: Vec<String>,
        schedule: ScheduleState,
    },
}

impl QuizOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }

    pub fn schedule(&self) -> &ScheduleState {
        match self {
            Self::Correct { schedule, .. } | Self::Incorrect { schedule, .. } => schedule,
        }
    }
}
