//! SQLite-backed implementation of [`RepertoireRepository`].

use sqlx::SqlitePool;

use super::helpers::{
    decode_color, decode_timestamp, encode_color, encode_timestamp, map_unique_violation,
};
use crate::persistence::traits::RepertoireRepository;
use crate::persistence::PersistenceError;
use crate::types::{NewRepertoire, Repertoire, RepertoireId, Timestamp};

/// Row type for repertoire queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct RepertoireRow {
    id: i64,
    name: String,
    color: String,
    rating: i64,
    coverage: f64,
    start_fen: String,
    created_at: i64,
}

impl TryFrom<RepertoireRow> for Repertoire {
    type Error = PersistenceError;

    fn try_from(row: RepertoireRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RepertoireId(row.id),
            name: row.name,
            color: decode_color(&row.color)?,
            rating: u32::try_from(row.rating)
                .map_err(|_| PersistenceError::Corrupt(format!("rating {}", row.rating)))?,
            coverage: row.coverage,
            start_fen: row.start_fen,
            created_at: decode_timestamp(row.created_at),
        })
    }
}

const SELECT_REPERTOIRE: &str =
    "SELECT id, name, color, rating, coverage, start_fen, created_at FROM repertoires";

/// SQLite implementation of [`RepertoireRepository`].
#[derive(Clone)]
pub struct SqliteRepertoireRepository {
    pool: SqlitePool,
}

impl SqliteRepertoireRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RepertoireRepository for SqliteRepertoireRepository {
    async fn create_repertoire(
        &self,
        new: &NewRepertoire,
        start_fen: &str,
        created_at: Timestamp,
    ) -> Result<Repertoire, PersistenceError> {
        let result = sqlx::query(
            "INSERT INTO repertoires (name, color, rating, coverage, start_fen, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(encode_color(new.color))
        .bind(i64::from(new.rating))
        .bind(new.coverage)
        .bind(start_fen)
        .bind(encode_timestamp(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || format!("repertoire '{}' already exists", new.name))
        })?;

        let id = RepertoireId(result.last_insert_rowid());
        tracing::debug!(rep_id = %id, name = %new.name, "Inserted repertoire");

        Ok(Repertoire {
            id,
            name: new.name.clone(),
            color: new.color,
            rating: new.rating,
            coverage: new.coverage,
            start_fen: start_fen.to_string(),
            created_at,
        })
    }

    async fn list_repertoires(&self) -> Result<Vec<Repertoire>, PersistenceError> {
        let rows: Vec<RepertoireRow> =
            sqlx::query_as(&format!("{SELECT_REPERTOIRE} ORDER BY id DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Repertoire::try_from).collect()
    }

    async fn load_repertoire(
        &self,
        id: RepertoireId,
    ) -> Result<Option<Repertoire>, PersistenceError> {
        let row: Option<RepertoireRow> =
            sqlx::query_as(&format!("{SELECT_REPERTOIRE} WHERE id = ?"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Repertoire::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Repertoire>, PersistenceError> {
        let row: Option<RepertoireRow> =
            sqlx::query_as(&format!("{SELECT_REPERTOIRE} WHERE name = ?"))
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Repertoire::try_from).transpose()
    }

    async fn update_repertoire(&self, repertoire: &Repertoire) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            "UPDATE repertoires SET name = ?, color = ?, rating = ?, coverage = ? WHERE id = ?",
        )
        .bind(&repertoire.name)
        .bind(encode_color(repertoire.color))
        .bind(i64::from(repertoire.rating))
        .bind(repertoire.coverage)
        .bind(repertoire.id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || format!("repertoire '{}' already exists", repertoire.name))
        })?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::RepertoireNotFound(repertoire.id));
        }
        Ok(())
    }

    async fn delete_repertoire(&self, id: RepertoireId) -> Result<bool, PersistenceError> {
        let result = sqlx::query("DELETE FROM repertoires WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        tracing::debug!(rep_id = %id, deleted = result.rows_affected(), "Deleted repertoire");
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::Database;
    use chess::{PieceColor, STARTING_FEN};

    async fn repo() -> SqliteRepertoireRepository {
        let db = Database::new_in_memory().await.unwrap();
        SqliteRepertoireRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_and_load_roundtrip() {
        let repo = repo().await;
        let new = NewRepertoire::new("Italian", PieceColor::White, 1600).with_coverage(5.0);
        let created = repo.create_repertoire(&new, STARTING_FEN, 1000).await.unwrap();
        assert!(created.id.is_valid());

        let loaded = repo.load_repertoire(created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.color, PieceColor::White);
        assert_eq!(loaded.rating, 1600);
        assert_eq!(loaded.coverage, 5.0);
        assert_eq!(loaded.start_fen, STARTING_FEN);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let repo = repo().await;
        let new = NewRepertoire::new("Sicilian", PieceColor::Black, 1800);
        repo.create_repertoire(&new, STARTING_FEN, 1).await.unwrap();

        let result = repo.create_repertoire(&new, STARTING_FEN, 2).await;
        assert!(
            matches!(result, Err(PersistenceError::Conflict(_))),
            "expected Conflict, got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = repo().await;
        for name in ["A", "B", "C"] {
            let new = NewRepertoire::new(name, PieceColor::White, 1500);
            repo.create_repertoire(&new, STARTING_FEN, 1).await.unwrap();
        }
        let names: Vec<String> = repo
            .list_repertoires()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let repo = repo().await;
        let new = NewRepertoire::new("London", PieceColor::White, 1400);
        repo.create_repertoire(&new, STARTING_FEN, 1).await.unwrap();
        assert!(repo.find_by_name("London").await.unwrap().is_some());
        assert!(repo.find_by_name("Paris").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_missing_update() {
        let repo = repo().await;
        let new = NewRepertoire::new("Caro", PieceColor::Black, 1500);
        let mut rep = repo.create_repertoire(&new, STARTING_FEN, 1).await.unwrap();
        rep.name = "Caro-Kann".to_string();
        rep.rating = 2000;
        rep.coverage = 12.5;
        repo.update_repertoire(&rep).await.unwrap();

        let loaded = repo.load_repertoire(rep.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Caro-Kann");
        assert_eq!(loaded.rating, 2000);
        assert_eq!(loaded.coverage, 12.5);

        rep.id = RepertoireId(999);
        let result = repo.update_repertoire(&rep).await;
        assert!(matches!(result, Err(PersistenceError::RepertoireNotFound(RepertoireId(999)))));
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_bad_coverage() {
        let repo = repo().await;
        let new = NewRepertoire::new("Bad", PieceColor::White, 1500).with_coverage(150.0);
        assert!(repo.create_repertoire(&new, STARTING_FEN, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let repo = repo().await;
        let new = NewRepertoire::new("Gone", PieceColor::White, 1500);
        let rep = repo.create_repertoire(&new, STARTING_FEN, 1).await.unwrap();
        assert!(repo.delete_repertoire(rep.id).await.unwrap());
        assert!(!repo.delete_repertoire(rep.id).await.unwrap());
        assert!(repo.load_repertoire(rep.id).await.unwrap().is_none());
    }
}
