//! SQLite-backed repository implementations.
//!
//! ## Database setup
//!
//! [`Database`] wraps a `sqlx::SqlitePool` configured with:
//! - **WAL mode** - one writer and multiple concurrent readers, so independent
//!   sessions on different repertoires can work side by side.
//! - **Foreign keys enabled** - edges reference existing nodes, nodes and
//!   edges cascade away with their repertoire.
//! - **Embedded migrations** - `sqlx::migrate!` runs `migrations/001_initial_schema.sql`
//!   automatically when [`Database::open`] is called.
//!
//! ## Repository types
//!
//! | Type | Trait |
//! |------|-------|
//! | [`SqliteRepertoireRepository`] | `RepertoireRepository` |
//! | [`SqliteGraphRepository`] | `GraphRepository` |
//!
//! Both hold a cloned `SqlitePool` and are cheap to clone themselves.

mod database;
mod graph_repo;
mod repertoire_repo;
#[cfg(test)]
mod integration_tests;
pub(crate) mod helpers;

pub use database::Database;
pub use graph_repo::SqliteGraphRepository;
pub use repertoire_repo::SqliteRepertoireRepository;
