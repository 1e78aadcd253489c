//! Connection pool for the repertoire store.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use super::{SqliteGraphRepository, SqliteRepertoireRepository};
use crate::persistence::PersistenceError;

const MAX_CONNECTIONS: u32 = 5;

/// How long a writer waits for the lock held by another session.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the repertoire database. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database file at `path`, creating it and its directory when
    /// missing, and bring the schema up to date.
    pub async fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        tracing::debug!(path = %path.display(), "Repertoire database ready");
        Ok(db)
    }

    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Each in-memory connection is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PersistenceError::Migration(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repertoire metadata on this pool.
    pub fn repertoires(&self) -> SqliteRepertoireRepository {
        SqliteRepertoireRepository::new(self.pool.clone())
    }

    /// Position graphs on this pool.
    pub fn graph(&self) -> SqliteGraphRepository {
        SqliteGraphRepository::new(self.pool.clone())
    }

    /// Close every connection, flushing the WAL.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
