//! Opening repertoire trainer.
//!
//! A repertoire is a graph of positions linked by the moves a player intends
//! to play, stored per repertoire in SQLite. A [`CursorSession`] walks that
//! graph to extend it and to quiz the player, the [`scheduler`] decides when
//! each position is due again, and the [`explorer`] ranks candidate moves from
//! game statistics.

pub mod catalog;
pub mod error;
pub mod explorer;
pub mod persistence;
pub mod rules;
pub mod scheduler;
pub mod session;
pub mod types;

pub use catalog::{RepertoireCatalog, RepertoireOverview};
pub use error::RepertoireError;
pub use explorer::{
    CoverageFilter, Explorer, FetchError, LichessExplorer, PositionStats, PositionSummary,
    StatsProvider,
};
pub use persistence::sqlite::Database;
pub use persistence::{GraphRepository, PersistenceError, RepertoireRepository};
pub use rules::{AppliedMove, Rules, RulesError, StandardRules};
pub use scheduler::{now_timestamp, Answer, ReviewMode, ScheduleState};
pub use session::{CursorSession, QuizOutcome};
pub use types::{MoveEdge, NewRepertoire, PositionNode, Repertoire, RepertoireId, Timestamp};
