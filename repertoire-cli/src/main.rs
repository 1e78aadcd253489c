//! `repertoire` - build and rehearse chess opening repertoires from the terminal.
//!
//! Positions inside a repertoire are addressed by the line leading to them,
//! e.g. `--line "e4 e5 Nf3"`, replayed from the repertoire's root.

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod logging;

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(name = "repertoire", version, about = "Opening repertoire trainer")]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a repertoire.
    New {
        name: String,
        /// Side you play: white or black.
        #[arg(short, long)]
        color: chess::PieceColor,
        /// Target rating, used for opening statistics.
        #[arg(short, long, default_value_t = 1500)]
        rating: u32,
        /// Coverage threshold in percent.
        #[arg(long, default_value_t = 0.0)]
        coverage: f64,
        /// Root position as FEN. Defaults to the initial position.
        #[arg(long)]
        start_fen: Option<String>,
    },
    /// List repertoires with their due positions.
    List,
    /// Change a repertoire's settings.
    Edit {
        repertoire: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(short, long)]
        color: Option<chess::PieceColor>,
        #[arg(short, long)]
        rating: Option<u32>,
        #[arg(long)]
        coverage: Option<f64>,
    },
    /// Delete a repertoire and everything recorded in it.
    Remove { repertoire: String },
    /// Show the moves recorded at a position.
    Moves {
        repertoire: String,
        #[arg(short, long, default_value = "")]
        line: String,
    },
    /// Record a move at a position.
    Add {
        repertoire: String,
        #[arg(value_name = "MOVE")]
        move_text: String,
        #[arg(short, long, default_value = "")]
        line: String,
    },
    /// Remove a recorded move and whatever only it leads to.
    Drop {
        repertoire: String,
        #[arg(value_name = "MOVE")]
        move_text: String,
        #[arg(short, long, default_value = "")]
        line: String,
    },
    /// List positions due for review.
    Due { repertoire: String },
    /// Rehearse due positions interactively.
    Drill { repertoire: String },
    /// Rank candidate moves at a position by how often they are played.
    Explore {
        repertoire: String,
        #[arg(short, long, default_value = "")]
        line: String,
        /// Hide moves played less often than this (percent).
        #[arg(long, conflicts_with = "coverage")]
        min_chance: Option<f64>,
        /// Hide moves played less often than the repertoire's coverage threshold.
        #[arg(long)]
        coverage: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(config::get_log_dir().as_deref())?;

    let db_path = config::get_database_path();
    tracing::debug!(path = %db_path.display(), "Opening database");
    let db = repertoire::Database::open(&db_path).await?;
    let app = commands::App::new(db, cli.json);

    match cli.command {
        Command::New {
            name,
            color,
            rating,
            coverage,
            start_fen,
        } => app.create(name, color, rating, coverage, start_fen).await,
        Command::List => app.list().await,
        Command::Edit {
            repertoire,
            rename,
            color,
            rating,
            coverage,
        } => app.edit(&repertoire, rename, color, rating, coverage).await,
        Command::Remove { repertoire } => app.remove(&repertoire).await,
        Command::Moves { repertoire, line } => app.moves(&repertoire, &line).await,
        Command::Add {
            repertoire,
            move_text,
            line,
        } => app.add(&repertoire, &line, &move_text).await,
        Command::Drop {
            repertoire,
            move_text,
            line,
        } => app.drop_move(&repertoire, &line, &move_text).await,
        Command::Due { repertoire } => app.due(&repertoire).await,
        Command::Drill { repertoire } => app.drill(&repertoire).await,
        Command::Explore {
            repertoire,
            line,
            min_chance,
            coverage,
        } => app.explore(&repertoire, &line, min_chance, coverage).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_line() {
        let cli = Cli::try_parse_from([
            "repertoire",
            "add",
            "Italian",
            "Bc4",
            "--line",
            "e4 e5 Nf3 Nc6",
        ])
        .unwrap();
        match cli.command {
            Command::Add {
                repertoire,
                move_text,
                line,
            } => {
                assert_eq!(repertoire, "Italian");
                assert_eq!(move_text, "Bc4");
                assert_eq!(line, "e4 e5 Nf3 Nc6");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_color() {
        let cli =
            Cli::try_parse_from(["repertoire", "new", "Caro", "--color", "black", "--json"])
                .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::New { color: chess::PieceColor::Black, rating: 1500, .. }
        ));
        assert!(Cli::try_parse_from(["repertoire", "new", "X", "--color", "green"]).is_err());
    }
}
