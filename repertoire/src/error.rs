use crate::explorer::FetchError;
use crate::persistence::PersistenceError;

/// Errors surfaced by the session, the catalog and the explorer.
///
/// A wrong quiz answer is not an error; see [`crate::session::QuizOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum RepertoireError {
    #[error("No repertoire selected")]
    InvalidSelection,

    #[error("Illegal move '{move_text}': {reason}")]
    IllegalMove { move_text: String, reason: String },

    #[error("No move '{move_text}' recorded from {position}")]
    EdgeNotFound { position: String, move_text: String },

    #[error("Position is not part of the repertoire: {0}")]
    UnknownPosition(String),

    #[error("Repertoire not found: {0}")]
    RepertoireNotFound(String),

    #[error("Invalid repertoire: {0}")]
    InvalidRepertoire(String),

    #[error("Storage error: {0}")]
    Graph(PersistenceError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<PersistenceError> for RepertoireError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::EdgeNotFound { parent, move_text } => Self::EdgeNotFound {
                position: parent,
                move_text,
            },
            PersistenceError::NodeNotFound { fen, .. } => Self::UnknownPosition(fen),
            PersistenceError::RepertoireNotFound(id) => Self::RepertoireNotFound(id.to_string()),
            other => Self::Graph(other),
        }
    }
}
