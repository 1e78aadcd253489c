//! SQLite-backed implementation of [`GraphRepository`].

use sqlx::SqlitePool;

use super::helpers::{decode_schedule, encode_schedule, encode_timestamp};
use crate::persistence::traits::GraphRepository;
use crate::persistence::PersistenceError;
use crate::scheduler::ScheduleState;
use crate::types::{MoveEdge, PositionNode, RepertoireId, Timestamp};

/// SQLite implementation of [`GraphRepository`].
#[derive(Clone)]
pub struct SqliteGraphRepository {
    pool: SqlitePool,
}

impl SqliteGraphRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl GraphRepository for SqliteGraphRepository {
    async fn start_position(
        &self,
        rep_id: RepertoireId,
    ) -> Result<Option<String>, PersistenceError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT start_fen FROM repertoires WHERE id = ?")
                .bind(rep_id.0)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(fen,)| fen))
    }

    async fn create_start_node(
        &self,
        rep_id: RepertoireId,
        start_fen: &str,
    ) -> Result<(), PersistenceError> {
        sqlx::query("INSERT OR IGNORE INTO nodes (rep_id, fen) VALUES (?, ?)")
            .bind(rep_id.0)
            .bind(start_fen)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_edge(
        &self,
        rep_id: RepertoireId,
        parent: &str,
        child: &str,
        move_text: &str,
        now: Timestamp,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        // First statement writes, so the transaction holds the write lock
        // before it reads anything. The parent has something new to rehearse.
        let touched =
            sqlx::query("UPDATE nodes SET box_index = 0, due_at = ? WHERE rep_id = ? AND fen = ?")
                .bind(encode_timestamp(now))
                .bind(rep_id.0)
                .bind(parent)
                .execute(&mut *tx)
                .await?;
        if touched.rows_affected() == 0 {
            return Err(PersistenceError::NodeNotFound {
                rep_id,
                fen: parent.to_string(),
            });
        }

        sqlx::query("INSERT OR IGNORE INTO nodes (rep_id, fen) VALUES (?, ?)")
            .bind(rep_id.0)
            .bind(child)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT OR IGNORE INTO edges (rep_id, parent_fen, child_fen, move) VALUES (?, ?, ?, ?)",
        )
        .bind(rep_id.0)
        .bind(parent)
        .bind(child)
        .bind(move_text)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(rep_id = %rep_id, %parent, %move_text, "Recorded move");
        Ok(())
    }

    async fn list_edges(
        &self,
        rep_id: RepertoireId,
        parent: &str,
    ) -> Result<Vec<String>, PersistenceError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT move FROM edges WHERE rep_id = ? AND parent_fen = ? ORDER BY rowid",
        )
        .bind(rep_id.0)
        .bind(parent)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(m,)| m).collect())
    }

    async fn list_moves(
        &self,
        rep_id: RepertoireId,
        parent: &str,
    ) -> Result<Vec<MoveEdge>, PersistenceError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT parent_fen, child_fen, move FROM edges \
             WHERE rep_id = ? AND parent_fen = ? ORDER BY rowid",
        )
        .bind(rep_id.0)
        .bind(parent)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(parent_fen, child_fen, move_text)| MoveEdge {
                parent_fen,
                child_fen,
                move_text,
            })
            .collect())
    }

    async fn delete_edge(
        &self,
        rep_id: RepertoireId,
        parent: &str,
        move_text: &str,
    ) -> Result<Vec<String>, PersistenceError> {
        let mut tx = self.pool.begin().await?;

        // Write lock first, as in `add_edge`.
        let children: Vec<(String,)> = sqlx::query_as(
            "DELETE FROM edges WHERE rep_id = ? AND parent_fen = ? AND move = ? \
             RETURNING child_fen",
        )
        .bind(rep_id.0)
        .bind(parent)
        .bind(move_text)
        .fetch_all(&mut *tx)
        .await?;

        let start: Option<(String,)> =
            sqlx::query_as("SELECT start_fen FROM repertoires WHERE id = ?")
                .bind(rep_id.0)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((start,)) = start else {
            return Err(PersistenceError::RepertoireNotFound(rep_id));
        };
        if children.is_empty() {
            return Err(PersistenceError::EdgeNotFound {
                parent: parent.to_string(),
                move_text: move_text.to_string(),
            });
        }

        // Walk down from the detached child. A position goes once nothing
        // points at it any more; its own moves go with it (FK cascade), which
        // may in turn orphan its children.
        let mut pending: Vec<String> = children.into_iter().map(|(fen,)| fen).collect();
        let mut removed: Vec<String> = Vec::new();

        while let Some(fen) = pending.pop() {
            if fen == start || removed.contains(&fen) {
                continue;
            }

            let (incoming,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM edges WHERE rep_id = ? AND child_fen = ?")
                    .bind(rep_id.0)
                    .bind(&fen)
                    .fetch_one(&mut *tx)
                    .await?;
            if incoming > 0 {
                continue;
            }

            let grandchildren: Vec<(String,)> =
                sqlx::query_as("SELECT child_fen FROM edges WHERE rep_id = ? AND parent_fen = ?")
                    .bind(rep_id.0)
                    .bind(&fen)
                    .fetch_all(&mut *tx)
                    .await?;

            sqlx::query("DELETE FROM nodes WHERE rep_id = ? AND fen = ?")
                .bind(rep_id.0)
                .bind(&fen)
                .execute(&mut *tx)
                .await?;

            pending.extend(grandchildren.into_iter().map(|(child,)| child));
            removed.push(fen);
        }

        tx.commit().await?;

        tracing::debug!(
            rep_id = %rep_id,
            %parent,
            %move_text,
            orphans = removed.len(),
            "Deleted move"
        );
        Ok(removed)
    }

    async fn list_due_nodes(
        &self,
        rep_id: RepertoireId,
        as_of: Timestamp,
    ) -> Result<Vec<String>, PersistenceError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT fen FROM nodes \
             WHERE rep_id = ? AND due_at IS NOT NULL AND due_at <= ? \
             ORDER BY due_at, fen",
        )
        .bind(rep_id.0)
        .bind(encode_timestamp(as_of))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(fen,)| fen).collect())
    }

    async fn count_due(
        &self,
        rep_id: RepertoireId,
        as_of: Timestamp,
    ) -> Result<usize, PersistenceError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM nodes WHERE rep_id = ? AND due_at IS NOT NULL AND due_at <= ?",
        )
        .bind(rep_id.0)
        .bind(encode_timestamp(as_of))
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }

    async fn get_node(
        &self,
        rep_id: RepertoireId,
        fen: &str,
    ) -> Result<Option<PositionNode>, PersistenceError> {
        let row: Option<(i64, Option<i64>, Option<i64>)> = sqlx::query_as(
            "SELECT box_index, due_at, last_reviewed FROM nodes WHERE rep_id = ? AND fen = ?",
        )
        .bind(rep_id.0)
        .bind(fen)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(box_index, due_at, last_reviewed)| PositionNode {
            rep_id,
            fen: fen.to_string(),
            schedule: decode_schedule(box_index, due_at, last_reviewed),
        }))
    }

    async fn update_schedule(
        &self,
        rep_id: RepertoireId,
        fen: &str,
        schedule: &ScheduleState,
    ) -> Result<(), PersistenceError> {
        let (box_index, due_at, last_reviewed) = encode_schedule(schedule);
        let result = sqlx::query(
            "UPDATE nodes SET box_index = ?, due_at = ?, last_reviewed = ? \
             WHERE rep_id = ? AND fen = ?",
        )
        .bind(box_index)
        .bind(due_at)
        .bind(last_reviewed)
        .bind(rep_id.0)
        .bind(fen)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NodeNotFound {
                rep_id,
                fen: fen.to_string(),
            });
        }
        Ok(())
    }

    async fn count_nodes(&self, rep_id: RepertoireId) -> Result<usize, PersistenceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM nodes WHERE rep_id = ?")
            .bind(rep_id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
