//! Domain records shared by the catalog, the graph store and the cursor.

use chess::PieceColor;
use serde::{Deserialize, Serialize};

use crate::scheduler::ScheduleState;

/// Unix timestamp in seconds. Always supplied by the caller.
pub type Timestamp = u64;

/// Opaque repertoire identifier. Valid ids are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepertoireId(pub i64);

impl RepertoireId {
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for RepertoireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named repertoire and the settings used to build and train it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repertoire {
    pub id: RepertoireId,
    pub name: String,
    /// Side the player plays in this repertoire.
    pub color: PieceColor,
    /// Target rating band, used when fetching opening statistics.
    pub rating: u32,
    /// Coverage threshold in percent (`0..=100`).
    pub coverage: f64,
    /// Canonical key of the root position.
    pub start_fen: String,
    pub created_at: Timestamp,
}

/// Input for creating a repertoire.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRepertoire {
    pub name: String,
    pub color: PieceColor,
    pub rating: u32,
    pub coverage: f64,
    /// Root position. `None` means the standard initial position.
    pub start_fen: Option<String>,
}

impl NewRepertoire {
    pub fn new(name: impl Into<String>, color: PieceColor, rating: u32) -> Self {
        Self {
            name: name.into(),
            color,
            rating,
            coverage: 0.0,
            start_fen: None,
        }
    }

    pub fn with_coverage(mut self, coverage: f64) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn with_start_fen(mut self, fen: impl Into<String>) -> Self {
        self.start_fen = Some(fen.into());
        self
    }
}

/// A position recorded in a repertoire together with its review schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionNode {
    pub rep_id: RepertoireId,
    pub fen: String,
    pub schedule: ScheduleState,
}

/// A recorded move: playing `move_text` from `parent_fen` reaches `child_fen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEdge {
    pub parent_fen: String,
    pub child_fen: String,
    pub move_text: String,
}
