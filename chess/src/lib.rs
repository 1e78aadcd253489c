//! Chess rules used by the repertoire trainer.
//!
//! Thin layer over cozy-chess: FEN parsing/formatting with a canonical
//! position key, and Standard Algebraic Notation for reading and writing moves.

pub mod fen;
pub mod san;
pub mod types;

pub use fen::{canonicalize, format_fen, parse_fen, starting_position, FenError, STARTING_FEN};
pub use san::{apply_san, format_san, legal_moves, legal_sans, parse_san, play_san, SanError};
pub use types::{ColorParseError, PieceColor, PieceKind};
