//! Pool setup for the snapshot database.
//!
//! A CLI invocation performs one action, so the pool holds a single
//! connection. Every connection it hands out has the pragmas below applied,
//! and the schema is migrated before the pool is returned.

use std::path::Path;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Schema of the `reservations` table, compiled in from `migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Wait on a locked file instead of failing, and make each committed
/// snapshot durable before the CLI exits.
const PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA synchronous = FULL;";

#[derive(Debug, Clone, Copy)]
struct SnapshotPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SnapshotPragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Open the database file at `path` and bring its schema up to date.
///
/// The parent directory must exist.
///
/// # Errors
/// [`StoreError::Unavailable`] if the file cannot be opened or migrated.
pub fn open_pool(path: &Path) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(path.to_string_lossy());
    let pool = Pool::builder()
        .max_size(1)
        .connection_customizer(Box::new(SnapshotPragmas))
        .build(manager)
        .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;

    let mut conn = pool
        .get()
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Unavailable(format!("migration failed: {e}")))?;
    if !applied.is_empty() {
        debug!(path = %path.display(), applied = applied.len(), "schema migrated");
    }
    drop(conn);
    Ok(pool)
}
