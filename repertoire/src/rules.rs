//! The chess-rules seam.
//!
//! The session never inspects positions itself. It asks a [`Rules`]
//! implementation to apply a move and to produce canonical position keys, so
//! tests and alternative front ends can inject their own rules.

use chess::SanError;

/// Outcome of applying a move to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Canonical notation of the move, as stored on edges.
    pub san: String,
    /// Canonical key of the resulting position.
    pub position: String,
}

/// Rejection from the rules collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RulesError(pub String);

impl From<SanError> for RulesError {
    fn from(err: SanError) -> Self {
        Self(err.to_string())
    }
}

pub trait Rules: Send + Sync {
    fn apply_move(&self, position: &str, move_text: &str) -> Result<AppliedMove, RulesError>;

    /// Normalise a position key so equal positions compare equal.
    fn canonicalize(&self, position: &str) -> Result<String, RulesError>;

    /// Key of the standard initial position.
    fn start_position(&self) -> String;
}

/// Standard chess, backed by the `chess` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl Rules for StandardRules {
    fn apply_move(&self, position: &str, move_text: &str) -> Result<AppliedMove, RulesError> {
        let (san, position) = chess::play_san(position, move_text)?;
        Ok(AppliedMove { san, position })
    }

    fn canonicalize(&self, position: &str) -> Result<String, RulesError> {
        chess::canonicalize(position).map_err(|e| RulesError(e.to_string()))
    }

    fn start_position(&self) -> String {
        chess::starting_position()
    }
}
