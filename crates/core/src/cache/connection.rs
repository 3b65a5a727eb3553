//! Opening the SQLite cache.

use std::path::Path;
use std::time::Duration;

use tokio_rusqlite::{Connection, rusqlite};

use super::migrations;
use crate::Error;

/// Concurrent requests write while others read; WAL keeps readers unblocked.
const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;";

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed result cache.
///
/// Queries run on tokio-rusqlite's dedicated thread; clones share it.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open (or create) the cache file at `path` and bring its schema up to date.
    ///
    /// Missing parent directories are created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("cache directory {}: {e}", parent.display())))?;
        }

        let conn = Connection::open(path).await.map_err(Error::from)?;
        Self::init(conn).await
    }

    /// Private in-memory cache, used by tests.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().await.map_err(Error::from)?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| -> rusqlite::Result<()> {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch(PRAGMAS)
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Number of stored rows, expired ones included.
    pub async fn entry_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM contributions_cache", [], |row| row.get::<_, i64>(0)))
            .await
            .map(|n| n.max(0) as u64)
            .map_err(Error::Database)
    }
}
