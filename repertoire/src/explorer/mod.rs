//! Opening statistics and candidate-move ranking.
//!
//! An [`Explorer`] asks a [`StatsProvider`] how often each move was played
//! from a position and how those games ended, then turns the raw counts into
//! percentages and a per-move *chance* (how often that move is met at the
//! given rating). It never reads or writes the repertoire graph; callers
//! merge the result with recorded moves via [`PositionSummary::mark_recorded`].

mod lichess;
mod summary;

pub use lichess::{rating_bucket, LichessExplorer, DEFAULT_EXPLORER_URL, DEFAULT_SPEEDS};
pub use summary::{CoverageFilter, MoveSummary, Outcomes, PositionSummary};

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Default time budget for a single statistics request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Aggregate game counts for a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionStats {
    pub white: u64,
    pub black: u64,
    pub draws: u64,
    pub moves: Vec<MoveStats>,
    /// Opening name, when the source knows it.
    pub opening: Option<String>,
}

/// Game counts after one move from the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    pub san: String,
    pub uci: Option<String>,
    pub white: u64,
    pub black: u64,
    pub draws: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Statistics request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Statistics service returned status {0}")]
    Status(u16),
    #[error("Statistics request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Statistics unavailable: {0}")]
    Unavailable(String),
}

/// Source of game statistics for a position.
pub trait StatsProvider: Send + Sync {
    /// Counts for `position` (a FEN) among games around `rating`.
    fn fetch_stats(
        &self,
        position: &str,
        rating: u32,
    ) -> impl Future<Output = Result<PositionStats, FetchError>> + Send;
}

/// Computes move summaries from a [`StatsProvider`] within a time budget.
pub struct Explorer<P> {
    provider: P,
    timeout: Duration,
}

impl<P: StatsProvider> Explorer<P> {
    pub fn new(provider: P) -> Self {
        Self::with_timeout(provider, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch statistics for `position` once and summarise them, best moves first.
    pub async fn summarize(
        &self,
        position: &str,
        rating: u32,
    ) -> Result<PositionSummary, FetchError> {
        let fetched =
            tokio::time::timeout(self.timeout, self.provider.fetch_stats(position, rating)).await;

        let stats = match fetched {
            Ok(Ok(stats)) => stats,
            Ok(Err(err)) => {
                tracing::warn!(
                    position = %position,
                    rating,
                    error = %err,
                    "Statistics fetch failed"
                );
                return Err(err);
            }
            Err(_) => {
                tracing::warn!(
                    position = %position,
                    rating,
                    timeout = ?self.timeout,
                    "Statistics fetch timed out"
                );
                return Err(FetchError::Timeout(self.timeout));
            }
        };

        tracing::debug!(position = %position, moves = stats.moves.len(), "Fetched statistics");
        Ok(PositionSummary::from_stats(position, stats))
    }
}
