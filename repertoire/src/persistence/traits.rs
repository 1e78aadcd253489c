//! Async repository trait definitions for the persistence layer.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send` and can be driven from `tokio::spawn`.
//!
//! Every graph operation is scoped by [`RepertoireId`]; two callers working on
//! different repertoires never touch the same rows.

use std::future::Future;

use super::PersistenceError;
use crate::scheduler::ScheduleState;
use crate::types::{MoveEdge, NewRepertoire, PositionNode, Repertoire, RepertoireId, Timestamp};

/// Repository for repertoire metadata.
///
/// Deleting a repertoire must cascade to all of its nodes and edges.
pub trait RepertoireRepository: Send + Sync {
    /// Insert a repertoire. `start_fen` must already be canonical.
    fn create_repertoire(
        &self,
        new: &NewRepertoire,
        start_fen: &str,
        created_at: Timestamp,
    ) -> impl Future<Output = Result<Repertoire, PersistenceError>> + Send;
    /// All repertoires, newest first.
    fn list_repertoires(
        &self,
    ) -> impl Future<Output = Result<Vec<Repertoire>, PersistenceError>> + Send;
    fn load_repertoire(
        &self,
        id: RepertoireId,
    ) -> impl Future<Output = Result<Option<Repertoire>, PersistenceError>> + Send;
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Repertoire>, PersistenceError>> + Send;
    /// Overwrite name, color, rating and coverage. The start position is fixed.
    fn update_repertoire(
        &self,
        repertoire: &Repertoire,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    /// Returns `false` when no such repertoire existed.
    fn delete_repertoire(
        &self,
        id: RepertoireId,
    ) -> impl Future<Output = Result<bool, PersistenceError>> + Send;
}

/// Repository for the position graph of each repertoire.
///
/// Implementations must guarantee:
/// - exactly one node per (repertoire, position key);
/// - an edge is only stored once both of its nodes exist;
/// - `delete_edge` never leaves an edge pointing at a missing node and never
///   removes the repertoire's start position.
pub trait GraphRepository: Send + Sync {
    /// Root position of the repertoire, `None` if it does not exist.
    fn start_position(
        &self,
        rep_id: RepertoireId,
    ) -> impl Future<Output = Result<Option<String>, PersistenceError>> + Send;
    /// Idempotent insert of the root node (box 0, never scheduled).
    fn create_start_node(
        &self,
        rep_id: RepertoireId,
        start_fen: &str,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    /// Record `move_text` from `parent` to `child`, creating `child` if needed,
    /// and make `parent` due at `now` in box 0. Atomic.
    fn add_edge(
        &self,
        rep_id: RepertoireId,
        parent: &str,
        child: &str,
        move_text: &str,
        now: Timestamp,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    /// Move texts recorded from `parent`, in insertion order.
    fn list_edges(
        &self,
        rep_id: RepertoireId,
        parent: &str,
    ) -> impl Future<Output = Result<Vec<String>, PersistenceError>> + Send;
    /// Full edges recorded from `parent`, in insertion order.
    fn list_moves(
        &self,
        rep_id: RepertoireId,
        parent: &str,
    ) -> impl Future<Output = Result<Vec<MoveEdge>, PersistenceError>> + Send;
    /// Remove an edge and any position left unreachable by it.
    /// Returns the keys of the removed positions.
    fn delete_edge(
        &self,
        rep_id: RepertoireId,
        parent: &str,
        move_text: &str,
    ) -> impl Future<Output = Result<Vec<String>, PersistenceError>> + Send;
    /// Keys of positions whose due timestamp is set and `<= as_of`.
    fn list_due_nodes(
        &self,
        rep_id: RepertoireId,
        as_of: Timestamp,
    ) -> impl Future<Output = Result<Vec<String>, PersistenceError>> + Send;
    fn count_due(
        &self,
        rep_id: RepertoireId,
        as_of: Timestamp,
    ) -> impl Future<Output = Result<usize, PersistenceError>> + Send;
    fn get_node(
        &self,
        rep_id: RepertoireId,
        fen: &str,
    ) -> impl Future<Output = Result<Option<PositionNode>, PersistenceError>> + Send;
    /// Overwrite the review schedule of an existing node.
    fn update_schedule(
        &self,
        rep_id: RepertoireId,
        fen: &str,
        schedule: &ScheduleState,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn count_nodes(
        &self,
        rep_id: RepertoireId,
    ) -> impl Future<Output = Result<usize, PersistenceError>> + Send;
}
