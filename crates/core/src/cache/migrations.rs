//! Cache schema migrations, tracked in SQLite's `user_version` pragma.

use super::Error;
use tokio_rusqlite::{Connection, rusqlite};

/// (version, SQL) pairs in ascending order.
pub(crate) const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_contributions_cache.sql"))];

/// Current schema version of an open connection.
pub(crate) fn schema_version(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Apply every migration newer than the stored schema version.
///
/// Each migration runs in its own transaction together with the version
/// bump, so a failed batch leaves the previous version in place.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current = schema_version(conn)?;

        for &(version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;

            tracing::debug!(version, "applied cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn version_of(conn: &Connection) -> i64 {
        conn.call(|conn| schema_version(conn)).await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_database_reaches_latest_version() {
        let conn = Connection::open_in_memory().await.unwrap();
        assert_eq!(version_of(&conn).await, 0);

        run(&conn).await.unwrap();
        assert_eq!(version_of(&conn).await, MIGRATIONS.last().map(|(v, _)| *v).unwrap());
    }

    #[tokio::test]
    async fn test_rerun_is_noop() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let tables: i64 = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'contributions_cache'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(tables, 1);
    }
}
