use cozy_chess::Board;

/// FEN of the standard initial position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = fen.trim();
    if fen.is_empty() {
        return Err(FenError::Empty);
    }
    if fen.split_whitespace().count() != 6 {
        return Err(FenError::InvalidFormat(fen.to_string()));
    }

    Board::from_fen(fen, false).map_err(|_| FenError::InvalidFormat(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

/// Canonical position key for a FEN.
///
/// Two FENs describing the same position (extra whitespace, different
/// en-passant spelling) map to the same key.
pub fn canonicalize(fen: &str) -> Result<String, FenError> {
    parse_fen(fen).map(|board| format_fen(&board))
}

/// Canonical key of the standard initial position.
pub fn starting_position() -> String {
    format_fen(&Board::default())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN")]
    Empty,
    #[error("Invalid FEN format: {0}")]
    InvalidFormat(String),
}
