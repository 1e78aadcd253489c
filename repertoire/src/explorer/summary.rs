use serde::Serialize;

use super::{MoveStats, PositionStats};

/// Share of a count in `total`, in percent. Zero when there is nothing to share.
fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Game results as percentages of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Outcomes {
    pub total: u64,
    pub white: f64,
    pub black: f64,
    pub draws: f64,
}

impl Outcomes {
    pub fn from_counts(white: u64, black: u64, draws: u64) -> Self {
        let total = white.saturating_add(black).saturating_add(draws);
        Self {
            total,
            white: percent(white, total),
            black: percent(black, total),
            draws: percent(draws, total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveSummary {
    pub san: String,
    pub uci: Option<String>,
    pub outcomes: Outcomes,
    /// How often this move is played from the position, in percent.
    pub chance: f64,
    /// Whether the move is already in the repertoire.
    pub recorded: bool,
}

/// Which candidate moves a caller considers in scope.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum CoverageFilter {
    /// Every move counts.
    #[default]
    Disabled,
    /// Only moves played at least this often (percent).
    MinChance(f64),
}

impl CoverageFilter {
    pub fn admits(&self, candidate: &MoveSummary) -> bool {
        match *self {
            Self::Disabled => true,
            Self::MinChance(threshold) => candidate.chance >= threshold,
        }
    }
}

/// Statistics for a position, moves ranked by chance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
    pub position: String,
    pub opening: Option<String>,
    pub outcomes: Outcomes,
    pub moves: Vec<MoveSummary>,
}

impl PositionSummary {
    pub fn from_stats(position: &str, stats: PositionStats) -> Self {
        let outcomes = Outcomes::from_counts(stats.white, stats.black, stats.draws);
        let mut moves: Vec<MoveSummary> = stats
            .moves
            .into_iter()
            .map(|m| summarize_move(m, outcomes.total))
            .collect();
        // Stable: equally frequent moves keep the provider's order.
        moves.sort_by(|a, b| b.chance.total_cmp(&a.chance));

        Self {
            position: position.to_string(),
            opening: stats.opening,
            outcomes,
            moves,
        }
    }

    /// Flag the moves whose notation appears in `recorded`.
    pub fn mark_recorded<S: AsRef<str>>(&mut self, recorded: &[S]) {
        for candidate in &mut self.moves {
            candidate.recorded = recorded.iter().any(|r| r.as_ref() == candidate.san);
        }
    }

    /// Moves admitted by `filter`, best first.
    pub fn candidates(&self, filter: CoverageFilter) -> impl Iterator<Item = &MoveSummary> {
        self.moves.iter().filter(move |m| filter.admits(m))
    }

    /// In-scope moves not yet in the repertoire.
    pub fn missing(&self, filter: CoverageFilter) -> impl Iterator<Item = &MoveSummary> {
        self.candidates(filter).filter(|m| !m.recorded)
    }
}

fn summarize_move(stats: MoveStats, position_total: u64) -> MoveSummary {
    let outcomes = Outcomes::from_counts(stats.white, stats.black, stats.draws);
    MoveSummary {
        chance: percent(outcomes.total, position_total),
        san: stats.san,
        uci: stats.uci,
        outcomes,
        recorded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mv(san: &str, white: u64, black: u64, draws: u64) -> MoveStats {
        MoveStats {
            san: san.to_string(),
            uci: None,
            white,
            black,
            draws,
        }
    }

    fn sample() -> PositionSummary {
        PositionSummary::from_stats(
            "fen",
            PositionStats {
                white: 400,
                black: 400,
                draws: 200,
                moves: vec![
                    mv("Nf3", 50, 40, 10),
                    mv("e4", 300, 200, 100),
                    mv("d4", 50, 160, 90),
                ],
                opening: Some("Queen's Pawn Game".to_string()),
            },
        )
    }

    #[test]
    fn test_zero_totals_give_zero_percentages() {
        assert_eq!(Outcomes::from_counts(0, 0, 0), Outcomes::default());

        let summary = PositionSummary::from_stats(
            "fen",
            PositionStats {
                moves: vec![mv("e4", 0, 0, 0)],
                ..Default::default()
            },
        );
        assert_eq!(summary.moves[0].chance, 0.0);
        assert_eq!(summary.outcomes.white, 0.0);
    }

    #[test]
    fn test_percentages_and_chance() {
        let summary = sample();
        assert_eq!(summary.outcomes.total, 1000);
        assert_eq!(summary.outcomes.white, 40.0);
        assert_eq!(summary.outcomes.draws, 20.0);

        let e4 = &summary.moves[0];
        assert_eq!(e4.san, "e4");
        assert_eq!(e4.chance, 60.0);
        assert_eq!(e4.outcomes.white, 50.0);
        assert_eq!(summary.opening.as_deref(), Some("Queen's Pawn Game"));
    }

    #[test]
    fn test_ranked_by_chance() {
        let sans: Vec<String> = sample().moves.into_iter().map(|m| m.san).collect();
        assert_eq!(sans, vec!["e4", "d4", "Nf3"]);
    }

    #[test]
    fn test_coverage_filter_is_opt_in() {
        let summary = sample();
        assert_eq!(summary.candidates(CoverageFilter::default()).count(), 3);

        let filtered: Vec<&str> = summary
            .candidates(CoverageFilter::MinChance(25.0))
            .map(|m| m.san.as_str())
            .collect();
        assert_eq!(filtered, vec!["e4", "d4"]);
        assert_eq!(summary.candidates(CoverageFilter::MinChance(100.0)).count(), 0);
    }

    #[test]
    fn test_mark_recorded_and_missing() {
        let mut summary = sample();
        summary.mark_recorded(&["e4".to_string(), "c4".to_string()]);
        assert!(summary.moves[0].recorded);
        assert!(!summary.moves[1].recorded);

        let missing: Vec<&str> = summary
            .missing(CoverageFilter::Disabled)
            .map(|m| m.san.as_str())
            .collect();
        assert_eq!(missing, vec!["d4", "Nf3"]);

        // Marking again replaces the previous flags.
        summary.mark_recorded::<&str>(&[]);
        assert!(summary.moves.iter().all(|m| !m.recorded));
    }

    proptest! {
        #[test]
        fn percentages_sum_to_hundred(
            white in 0u64..1_000_000,
            black in 0u64..1_000_000,
            draws in 0u64..1_000_000,
        ) {
            let outcomes = Outcomes::from_counts(white, black, draws);
            let sum = outcomes.white + outcomes.black + outcomes.draws;
            if outcomes.total == 0 {
                prop_assert_eq!(sum, 0.0);
            } else {
                prop_assert!((sum - 100.0).abs() < 1e-9);
            }
        }
    }
}
