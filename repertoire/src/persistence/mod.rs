//! Storage for repertoires and their position graphs.
//!
//! [`traits`] defines the repository contracts; [`sqlite`] implements them on
//! top of an `sqlx` SQLite pool.

pub mod sqlite;
pub mod traits;

pub use traits::{GraphRepository, RepertoireRepository};

use crate::types::RepertoireId;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Repertoire not found: {0}")]
    RepertoireNotFound(RepertoireId),
    #[error("Position not found in repertoire {rep_id}: {fen}")]
    NodeNotFound { rep_id: RepertoireId, fen: String },
    #[error("No move '{move_text}' recorded from {parent}")]
    EdgeNotFound { parent: String, move_text: String },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}
