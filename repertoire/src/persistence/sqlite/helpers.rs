//! Shared encode/decode helpers for SQLite ↔ domain type conversions.
//!
//! These functions bridge the gap between domain types and the string/integer
//! columns used in the SQLite schema's CHECK constraints.

use chess::PieceColor;

use crate::persistence::PersistenceError;
use crate::scheduler::{ScheduleState, MAX_BOX};
use crate::types::Timestamp;

// ── PieceColor ─────────────────────────────────────────────────────────

/// Encode a repertoire color for the `color` column.
pub fn encode_color(color: PieceColor) -> &'static str {
    color.as_str()
}

/// Decode the `color` column. Anything outside the CHECK constraint is corrupt.
pub fn decode_color(s: &str) -> Result<PieceColor, PersistenceError> {
    match s {
        "white" => Ok(PieceColor::White),
        "black" => Ok(PieceColor::Black),
        other => Err(PersistenceError::Corrupt(format!("unknown color '{other}'"))),
    }
}

// ── Timestamps ─────────────────────────────────────────────────────────

/// SQLite integers are signed; timestamps past `i64::MAX` are clamped.
pub fn encode_timestamp(ts: Timestamp) -> i64 {
    i64::try_from(ts).unwrap_or(i64::MAX)
}

pub fn decode_timestamp(value: i64) -> Timestamp {
    u64::try_from(value).unwrap_or(0)
}

// ── ScheduleState ──────────────────────────────────────────────────────

/// Encode a schedule into `(box_index, due_at, last_reviewed)` columns.
pub fn encode_schedule(state: &ScheduleState) -> (i64, Option<i64>, Option<i64>) {
    (
        i64::from(state.box_index.min(MAX_BOX)),
        state.due.map(encode_timestamp),
        state.last_reviewed.map(encode_timestamp),
    )
}

/// Decode schedule columns back into a `ScheduleState`.
pub fn decode_schedule(
    box_index: i64,
    due_at: Option<i64>,
    last_reviewed: Option<i64>,
) -> ScheduleState {
    ScheduleState {
        box_index: box_index.clamp(0, i64::from(MAX_BOX)) as u8,
        due: due_at.map(decode_timestamp),
        last_reviewed: last_reviewed.map(decode_timestamp),
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Turn a UNIQUE violation into [`PersistenceError::Conflict`], pass anything
/// else through unchanged.
pub fn map_unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> PersistenceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return PersistenceError::Conflict(what());
        }
    }
    PersistenceError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_roundtrip() {
        for color in [PieceColor::White, PieceColor::Black] {
            assert_eq!(decode_color(encode_color(color)).unwrap(), color);
        }
        assert!(matches!(decode_color("green"), Err(PersistenceError::Corrupt(_))));
    }

    #[test]
    fn schedule_roundtrip_with_nulls() {
        let state = ScheduleState::default();
        let (b, d, l) = encode_schedule(&state);
        assert_eq!((b, d, l), (0, None, None));
        assert_eq!(decode_schedule(b, d, l), state);
    }

    #[test]
    fn schedule_roundtrip_with_values() {
        let state = ScheduleState {
            box_index: 2,
            due: Some(1_700_000_000),
            last_reviewed: Some(1_699_000_000),
        };
        let (b, d, l) = encode_schedule(&state);
        assert_eq!(decode_schedule(b, d, l), state);
    }

    #[test]
    fn out_of_range_box_is_clamped() {
        assert_eq!(decode_schedule(7, None, None).box_index, MAX_BOX);
        assert_eq!(decode_schedule(-1, None, None).box_index, 0);
    }

    #[test]
    fn huge_timestamps_clamp_instead_of_wrapping() {
        assert_eq!(encode_timestamp(u64::MAX), i64::MAX);
        assert_eq!(decode_timestamp(-5), 0);
    }
}
