//! Subcommand handlers.

use std::str::FromStr;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use chess::PieceColor;
use repertoire::explorer::{CoverageFilter, Explorer, LichessExplorer};
use repertoire::persistence::sqlite::{SqliteGraphRepository, SqliteRepertoireRepository};
use repertoire::{
    now_timestamp, CursorSession, Database, NewRepertoire, QuizOutcome, Repertoire,
    RepertoireCatalog, RepertoireId,
};

use crate::config;

type Catalog = RepertoireCatalog<SqliteRepertoireRepository, SqliteGraphRepository>;
type Session = CursorSession<SqliteGraphRepository>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no repertoire named or numbered '{0}'")]
    UnknownRepertoire(String),
    #[error("cannot replay '{line}' at move '{failed}': {source}")]
    Line {
        line: String,
        failed: String,
        #[source]
        source: repertoire::RepertoireError,
    },
}

/// Moves of a line, with move numbers ("1.", "12...", "3.Nf3") stripped.
pub fn line_moves(line: &str) -> Vec<&str> {
    line.split_whitespace()
        .map(strip_move_number)
        .filter(|token| !token.is_empty())
        .collect()
}

fn strip_move_number(token: &str) -> &str {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < token.len() && rest.starts_with('.') {
        rest.trim_start_matches('.')
    } else {
        token
    }
}

/// Side to move in a FEN, if it can be read.
fn side_to_move(fen: &str) -> Option<PieceColor> {
    fen.split_whitespace()
        .nth(1)
        .and_then(|side| PieceColor::from_str(side).ok())
}

pub struct App {
    db: Database,
    json: bool,
}

impl App {
    pub fn new(db: Database, json: bool) -> Self {
        Self { db, json }
    }

    fn catalog(&self) -> Catalog {
        RepertoireCatalog::new(self.db.repertoires(), self.db.graph())
    }

    /// Print `value` as JSON in `--json` mode, otherwise run `human`.
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }

    /// Find a repertoire by name, or by id when no name matches.
    async fn resolve(&self, key: &str) -> anyhow::Result<Repertoire> {
        let catalog = self.catalog();
        if let Some(rep) = catalog.find_by_name(key).await? {
            return Ok(rep);
        }
        if let Ok(id) = key.trim().parse::<i64>() {
            if let Ok(rep) = catalog.get(RepertoireId(id)).await {
                return Ok(rep);
            }
        }
        Err(CliError::UnknownRepertoire(key.to_string()).into())
    }

    /// A session on `rep`, positioned at the end of `line`.
    async fn session_at(&self, rep: &Repertoire, line: &str) -> anyhow::Result<Session> {
        let mut session = CursorSession::standard(self.db.graph());
        session.select(rep.id).await?;
        for mv in line_moves(line) {
            session.play_move(mv).map_err(|source| CliError::Line {
                line: line.to_string(),
                failed: mv.to_string(),
                source,
            })?;
        }
        Ok(session)
    }

    pub async fn create(
        &self,
        name: String,
        color: PieceColor,
        rating: u32,
        coverage: f64,
        start_fen: Option<String>,
    ) -> anyhow::Result<()> {
        let mut new = NewRepertoire::new(name, color, rating).with_coverage(coverage);
        if let Some(fen) = start_fen {
            new = new.with_start_fen(fen);
        }
        let rep = self.catalog().create(new, now_timestamp()).await?;
        self.emit(&rep, |rep| {
            println!(
                "Created repertoire #{} '{}' ({}, rating {})",
                rep.id, rep.name, rep.color, rep.rating
            )
        })
    }

    pub async fn list(&self) -> anyhow::Result<()> {
        let overview = self.catalog().list_with_due(now_timestamp()).await?;
        self.emit(&overview, |overview| {
            if overview.is_empty() {
                println!("No repertoires yet. Create one with `repertoire new`.");
                return;
            }
            println!(
                "{:>4}  {:<24} {:<6} {:>6} {:>8} {:>9} {:>4}",
                "id", "name", "color", "rating", "coverage", "positions", "due"
            );
            for entry in overview {
                let rep = &entry.repertoire;
                println!(
                    "{:>4}  {:<24} {:<6} {:>6} {:>7.1}% {:>9} {:>4}",
                    rep.id,
                    rep.name,
                    rep.color,
                    rep.rating,
                    rep.coverage,
                    entry.positions,
                    entry.due
                );
            }
        })
    }

    pub async fn edit(
        &self,
        key: &str,
        rename: Option<String>,
        color: Option<PieceColor>,
        rating: Option<u32>,
        coverage: Option<f64>,
    ) -> anyhow::Result<()> {
        let mut rep = self.resolve(key).await?;
        if let Some(name) = rename {
            rep.name = name;
        }
        if let Some(color) = color {
            rep.color = color;
        }
        if let Some(rating) = rating {
            rep.rating = rating;
        }
        if let Some(coverage) = coverage {
            rep.coverage = coverage;
        }
        let catalog = self.catalog();
        catalog.update(&rep).await?;
        let rep = catalog.get(rep.id).await?;
        self.emit(&rep, |rep| println!("Updated repertoire #{} '{}'", rep.id, rep.name))
    }

    pub async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let rep = self.resolve(key).await?;
        self.catalog().delete(rep.id).await?;
        self.emit(&rep, |rep| println!("Removed repertoire '{}'", rep.name))
    }

    pub async fn moves(&self, key: &str, line: &str) -> anyhow::Result<()> {
        let rep = self.resolve(key).await?;
        let session = self.session_at(&rep, line).await?;
        let moves = session.list_moves().await?;
        self.emit(&moves, |moves| {
            println!("{}", session.position().unwrap_or_default());
            if moves.is_empty() {
                println!("No moves recorded here.");
            }
            for edge in moves {
                println!("  {}", edge.move_text);
            }
        })
    }

    pub async fn add(&self, key: &str, line: &str, move_text: &str) -> anyhow::Result<()> {
        let rep = self.resolve(key).await?;
        let mut session = self.session_at(&rep, line).await?;
        let applied = session
            .extend(move_text, now_timestamp())
            .await
            .with_context(|| format!("recording '{move_text}' in '{}'", rep.name))?;

        #[derive(Serialize)]
        struct Recorded<'a> {
            san: &'a str,
            position: &'a str,
        }
        let recorded = Recorded {
            san: &applied.san,
            position: &applied.position,
        };
        self.emit(&recorded, |r| println!("Recorded {} -> {}", r.san, r.position))
    }

    pub async fn drop_move(&self, key: &str, line: &str, move_text: &str) -> anyhow::Result<()> {
        let rep = self.resolve(key).await?;
        let mut session = self.session_at(&rep, line).await?;
        let removed = session.delete_edge(move_text).await?;
        self.emit(&removed, |removed| {
            println!(
                "Removed '{}' and {} position(s) no longer reachable",
                move_text.trim(),
                removed.len()
            )
        })
    }

    pub async fn due(&self, key: &str) -> anyhow::Result<()> {
        let rep = self.resolve(key).await?;
        let session = self.session_at(&rep, "").await?;
        let due = session.due_positions(now_timestamp()).await?;
        self.emit(&due, |due| {
            println!("{} position(s) due in '{}'", due.len(), rep.name);
            for fen in due {
                println!("  {fen}");
            }
        })
    }

    /// Quiz every position that is due now, reading answers from stdin.
    pub async fn drill(&self, key: &str) -> anyhow::Result<()> {
        let rep = self.resolve(key).await?;
        let mut session = self.session_at(&rep, "").await?;
        let due = session.due_positions(now_timestamp()).await?;
        if due.is_empty() {
            println!("Nothing due in '{}'.", rep.name);
            return Ok(());
        }

        println!("{} position(s) due. Enter your move, or a blank line to stop.", due.len());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let (mut correct, mut answered) = (0usize, 0usize);

        for fen in due {
            session.jump_to(&fen).await?;
            let side = side_to_move(&fen).map_or("?", PieceColor::as_str);
            println!("\n{fen}\n{side} to move:");

            let Some(answer) = lines.next_line().await? else {
                break;
            };
            let answer = answer.trim();
            if answer.is_empty() {
                break;
            }

            answered += 1;
            match session.quiz_with_reschedule(answer, now_timestamp()).await? {
                QuizOutcome::Correct { played, .. } => {
                    correct += 1;
                    println!("Correct: {played}");
                }
                QuizOutcome::Incorrect { expected, .. } => {
                    println!("Not quite. Expected: {}", expected.join(", "));
                }
            }
        }

        println!("\n{correct}/{answered} correct.");
        Ok(())
    }

    pub async fn explore(
        &self,
        key: &str,
        line: &str,
        min_chance: Option<f64>,
        use_coverage: bool,
    ) -> anyhow::Result<()> {
        let rep = self.resolve(key).await?;
        let session = self.session_at(&rep, line).await?;
        let position = session.position()?.to_string();

        let timeout = config::get_explorer_timeout();
        let provider = LichessExplorer::new(config::get_explorer_url(), timeout)?
            .with_speeds(config::get_explorer_speeds());
        let explorer = Explorer::with_timeout(provider, timeout);

        let mut summary = explorer.summarize(&position, rep.rating).await?;
        summary.mark_recorded(&session.list_edges().await?);

        let filter = match (min_chance, use_coverage) {
            (Some(threshold), _) => CoverageFilter::MinChance(threshold),
            (None, true) => CoverageFilter::MinChance(rep.coverage),
            (None, false) => CoverageFilter::Disabled,
        };
        let candidates: Vec<_> = summary.candidates(filter).cloned().collect();

        self.emit(&candidates, |candidates| {
            if let Some(opening) = &summary.opening {
                println!("{opening}");
            }
            println!(
                "{} games: white {:.1}%  draw {:.1}%  black {:.1}%",
                summary.outcomes.total,
                summary.outcomes.white,
                summary.outcomes.draws,
                summary.outcomes.black
            );
            for m in candidates {
                println!(
                    "{} {:<8} {:>6.1}%  {:>8} games  W {:>5.1}%  D {:>5.1}%  B {:>5.1}%",
                    if m.recorded { "*" } else { " " },
                    m.san,
                    m.chance,
                    m.outcomes.total,
                    m.outcomes.white,
                    m.outcomes.draws,
                    m.outcomes.black
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_moves_strips_numbers() {
        assert_eq!(line_moves(""), Vec::<&str>::new());
        assert_eq!(line_moves("e4 e5 Nf3"), vec!["e4", "e5", "Nf3"]);
        assert_eq!(line_moves("1. e4 e5 2.Nf3 2... Nc6"), vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(line_moves("  1.d4   d5 "), vec!["d4", "d5"]);
    }

    #[test]
    fn test_castling_survives_number_stripping() {
        assert_eq!(line_moves("5. O-O 0-0 6.0-0-0"), vec!["O-O", "0-0", "0-0-0"]);
    }

    #[test]
    fn test_side_to_move() {
        assert_eq!(side_to_move(chess::STARTING_FEN), Some(PieceColor::White));
        assert_eq!(
            side_to_move("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"),
            Some(PieceColor::Black)
        );
        assert_eq!(side_to_move("garbage"), None);
    }

    #[tokio::test]
    async fn test_resolve_and_replay_line() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("cli.db")).await.unwrap();
        let app = App::new(db, false);

        app.create("Italian".into(), PieceColor::White, 1600, 0.0, None)
            .await
            .unwrap();
        let rep = app.resolve("Italian").await.unwrap();
        assert_eq!(app.resolve(&rep.id.to_string()).await.unwrap().name, "Italian");
        assert!(app.resolve("Dutch").await.is_err());

        app.add("Italian", "", "e4").await.unwrap();
        app.add("Italian", "1. e4", "e5").await.unwrap();
        let session = app.session_at(&rep, "e4").await.unwrap();
        assert_eq!(session.list_edges().await.unwrap(), vec!["e5"]);

        let err = app.session_at(&rep, "e4 Ke2").await.err().unwrap();
        assert!(err.to_string().contains("'Ke2'"), "unexpected error: {err}");
    }
}
