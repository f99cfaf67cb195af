//! Database module for interaction persistence

mod interaction;
mod interaction_log;
mod schema;

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::{Error, Result};

pub use interaction::{Interaction, InteractionRepo};
pub use interaction_log::InteractionLog;
pub use schema::SCHEMA_VERSION;

/// Store location that keeps everything in a single in-memory connection
pub const MEMORY_URL: &str = ":memory:";

/// Database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Initialize the database
///
/// Opens the pool within `timeout`, checks liveness and runs migrations.
/// `url` is a file path (an optional `sqlite://` prefix is accepted) or
/// [`MEMORY_URL`].
///
/// # Errors
///
/// Returns error if the database cannot be reached in time or initialized
pub fn init(url: &str, timeout: Duration) -> Result<DbPool> {
    let builder = Pool::builder().connection_timeout(timeout);

    let built = if url == MEMORY_URL {
        // Every in-memory connection is its own database, so keep exactly one alive
        builder
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())
    } else {
        let path = Path::new(url.strip_prefix("sqlite://").unwrap_or(url));
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        builder.max_size(4).build(SqliteConnectionManager::file(path))
    };
    let pool = built.map_err(|e| Error::Database(e.to_string()))?;

    let conn = pool.get().map_err(|e| Error::Database(e.to_string()))?;
    conn.query_row("SELECT 1", [], |_| Ok(()))?;
    schema::init(&conn)?;

    tracing::info!(version = SCHEMA_VERSION, "database initialized");
    Ok(pool)
}

/// Initialize an in-memory database (for testing)
///
/// # Errors
///
/// Returns error if database cannot be initialized
pub fn init_memory() -> Result<DbPool> {
    init(MEMORY_URL, Duration::from_secs(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory() {
        let pool = init_memory().unwrap();
        let _conn = pool.get().unwrap();
    }

    #[test]
    fn test_init_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("interactions.db");

        let pool = init(path.to_str().unwrap(), Duration::from_secs(5)).unwrap();
        drop(pool);

        assert!(path.exists());
    }

    #[test]
    fn test_init_unreachable_path_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // Parent is a regular file, so nothing can be created beneath it
        let path = file.path().join("interactions.db");

        assert!(init(path.to_str().unwrap(), Duration::from_millis(200)).is_err());
    }
}
