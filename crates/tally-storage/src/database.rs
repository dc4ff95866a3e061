// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes;
//! query modules accept `&Database` and go through [`Database::connection`].

use tally_core::TallyError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Handle to the SQLite database. Cloning the inner connection is cheap;
/// all clones share the same background writer thread.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// all pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Database, TallyError> {
        let conn = Connection::open(path.to_owned())
            .await
            .map_err(TallyError::storage)?;

        conn.call(move |conn| {
            let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
            // journal_mode returns a row, so it cannot go through execute_batch's
            // no-row path on some drivers; query it explicitly.
            conn.pragma_update(None, "journal_mode", journal_mode)
                .map_err(TallyError::storage)?;
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;",
            )
            .map_err(TallyError::storage)?;
            crate::migrations::run_migrations(conn)?;
            Ok::<(), TallyError>(())
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(te) => te,
            other => TallyError::storage(other),
        })?;

        debug!(path, wal_mode, "database opened");
        Ok(Database { conn })
    }

    /// The shared tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush pending writes.
    pub async fn close(&self) -> Result<(), TallyError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(err: tokio_rusqlite::Error) -> TallyError {
    TallyError::Storage {
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        // The migration must have created the queue table.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master
                     WHERE type = 'table' AND name = 'archive_invalidation'",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");

        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Second open re-runs the migration runner against an up-to-date
        // schema and must succeed without error.
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
    }
}
