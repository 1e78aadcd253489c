//! Standard Algebraic Notation (SAN) parsing and formatting.
//!
//! Parsing works by formatting every legal move in the position and comparing
//! against the normalised input, so the accepted notation is always in sync
//! with the notation we produce.

use cozy_chess::{Board, GameStatus, Move, Piece, Square};

use crate::fen::{format_fen, parse_fen, FenError};
use crate::types::PieceKind;

/// All legal moves in `board`.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

/// Parse Standard Algebraic Notation (SAN) move
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let wanted = normalize(san);
    if wanted.is_empty() {
        return Err(SanError::Empty);
    }

    let legal = legal_moves(board);
    let candidates: Vec<(Move, String)> = legal
        .iter()
        .filter_map(|&mv| san_body(board, mv, &legal).map(|s| (mv, normalize(&s))))
        .collect();

    let exact: Vec<Move> = candidates
        .iter()
        .filter(|(_, s)| *s == wanted)
        .map(|(mv, _)| *mv)
        .collect();
    if let [mv] = exact.as_slice() {
        return Ok(*mv);
    }

    // Tolerate a missing or superfluous capture marker ("Nxf3" vs "Nf3").
    let loose_wanted = wanted.replace('x', "");
    let loose: Vec<Move> = candidates
        .iter()
        .filter(|(_, s)| s.replace('x', "") == loose_wanted)
        .map(|(mv, _)| *mv)
        .collect();

    match loose.as_slice() {
        [mv] => Ok(*mv),
        [] if is_underspecified(board, &wanted, &legal) => {
            Err(SanError::AmbiguousMove(san.trim().to_string()))
        }
        [] => Err(SanError::NoLegalMove(san.trim().to_string())),
        _ => Err(SanError::AmbiguousMove(san.trim().to_string())),
    }
}

/// Format a legal move as SAN, including check (`+`) and mate (`#`) suffixes.
pub fn format_san(board: &Board, mv: Move) -> Result<String, SanError> {
    let legal = legal_moves(board);
    if !legal.contains(&mv) {
        return Err(SanError::IllegalMove(mv.to_string()));
    }
    let mut san =
        san_body(board, mv, &legal).ok_or_else(|| SanError::IllegalMove(mv.to_string()))?;

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        if matches!(after.status(), GameStatus::Won) {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    Ok(san)
}

/// Apply a SAN move to a FEN position and return the resulting FEN.
pub fn apply_san(fen: &str, san: &str) -> Result<String, SanError> {
    let mut board = parse_fen(fen)?;
    let mv = parse_san(&board, san)?;
    board.play_unchecked(mv);
    Ok(format_fen(&board))
}

/// Apply a SAN move and return its canonical SAN together with the resulting FEN.
///
/// Input like `Nxf3`, `0-0` or `e4+` comes back as the notation [`format_san`]
/// would produce for that move.
pub fn play_san(fen: &str, san: &str) -> Result<(String, String), SanError> {
    let mut board = parse_fen(fen)?;
    let mv = parse_san(&board, san)?;
    let canonical = format_san(&board, mv)?;
    board.play_unchecked(mv);
    Ok((canonical, format_fen(&board)))
}

/// SAN of every legal move in the position, in generation order.
pub fn legal_sans(fen: &str) -> Result<Vec<String>, SanError> {
    let board = parse_fen(fen)?;
    legal_moves(&board)
        .into_iter()
        .map(|mv| format_san(&board, mv))
        .collect()
}

/// SAN without check/mate suffix.
fn san_body(board: &Board, mv: Move, legal: &[Move]) -> Option<String> {
    let piece = board.piece_on(mv.from)?;
    let side = board.side_to_move();

    // cozy-chess encodes castling as the king capturing its own rook.
    if piece == Piece::King && board.color_on(mv.to) == Some(side) {
        return Some(if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        });
    }

    let is_capture = board.piece_on(mv.to).is_some()
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    let mut san = String::new();
    match PieceKind::from(piece).san_letter() {
        None => {
            if is_capture {
                san.push(file_char(mv.from));
            }
        }
        Some(letter) => {
            san.push(letter);
            san.push_str(&disambiguation(board, mv, piece, legal));
        }
    }

    if is_capture {
        san.push('x');
    }
    san.push(file_char(mv.to));
    san.push(rank_char(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(PieceKind::from(promo).san_letter()?);
    }

    Some(san)
}

fn disambiguation(board: &Board, mv: Move, piece: Piece, legal: &[Move]) -> String {
    let rivals: Vec<Square> = legal
        .iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        return file_char(mv.from).to_string();
    }
    if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        return rank_char(mv.from).to_string();
    }
    format!("{}{}", file_char(mv.from), rank_char(mv.from))
}

/// True when `wanted` names a piece move that several legal moves satisfy
/// once disambiguation is ignored (e.g. "Nd2" with knights on b1 and f3).
fn is_underspecified(board: &Board, wanted: &str, legal: &[Move]) -> bool {
    let mut chars = wanted.chars();
    let Some(letter) = chars.next() else {
        return false;
    };
    let Some(kind) = PieceKind::from_san_letter(letter) else {
        return false;
    };
    let tail: Vec<char> = chars.collect();
    let dest: String = tail[tail.len().saturating_sub(2)..].iter().collect();

    legal
        .iter()
        .filter(|mv| {
            board.piece_on(mv.from) == Some(kind.into())
                && format!("{}{}", file_char(mv.to), rank_char(mv.to)) == dest
        })
        .count()
        > 1
}

/// Strip annotations so user input and generated SAN compare equal.
fn normalize(san: &str) -> String {
    let mut s = san.trim().to_string();
    if let Some(stripped) = s.strip_suffix("e.p.") {
        s = stripped.trim_end().to_string();
    }
    let s = s.trim_end_matches(['+', '#', '!', '?']);
    let s = if s.starts_with("0-0") { s.replace('0', "O") } else { s.to_string() };
    s.replace('=', "")
}

fn file_char(square: Square) -> char {
    (b'a' + square.file() as u8) as char
}

fn rank_char(square: Square) -> char {
    (b'1' + square.rank() as u8) as char
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("Empty move")]
    Empty,
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("{0}")]
    Fen(#[from] FenError),
}
