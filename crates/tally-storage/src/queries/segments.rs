// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment catalog reads plus the seed insert used by provisioning and tests.

use rusqlite::params;
use tally_core::TallyError;

use crate::database::{map_tr_err, Database};
use crate::models::StoredSegment;

/// Insert a stored segment. Returns the auto-generated segment id.
pub async fn insert_segment(
    db: &Database,
    name: &str,
    definition: &str,
    enable_only_idsite: Option<i64>,
    auto_archive: bool,
) -> Result<i64, TallyError> {
    let name = name.to_string();
    let definition = definition.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO segment (name, definition, enable_only_idsite, auto_archive,
                                      ts_created)
                 VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%d %H:%M:%S', 'now'))",
                params![name, definition, enable_only_idsite, auto_archive as i64],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All live (non-deleted) stored segments, ordered by id.
pub async fn all_segments(db: &Database) -> Result<Vec<StoredSegment>, TallyError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT idsegment, name, definition, enable_only_idsite, auto_archive
                 FROM segment WHERE deleted = 0 ORDER BY idsegment",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(StoredSegment {
                    idsegment: row.get(0)?,
                    name: row.get(1)?,
                    definition: row.get(2)?,
                    enable_only_idsite: row.get(3)?,
                    auto_archive: row.get::<_, i64>(4)? != 0,
                })
            })?;
            let mut segments = Vec::new();
            for row in rows {
                segments.push(row?);
            }
            Ok(segments)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn insert_and_list_segments() {
        let (db, _dir) = setup_db().await;

        let id1 = insert_segment(&db, "test segment", "browserCode==IE", None, true)
            .await
            .unwrap();
        let id2 = insert_segment(&db, "custom dimension", "dimension1==test", Some(1), true)
            .await
            .unwrap();
        assert!(id2 > id1);

        let segments = all_segments(&db).await.unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].name, "test segment");
        assert_eq!(segments[0].enable_only_idsite, None);
        assert!(segments[0].auto_archive);
        assert_eq!(segments[1].enable_only_idsite, Some(1));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn deleted_segments_are_invisible() {
        let (db, _dir) = setup_db().await;

        let id = insert_segment(&db, "gone", "browserCode==FF", None, false)
            .await
            .unwrap();
        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("UPDATE segment SET deleted = 1 WHERE idsegment = ?1", [id])?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(all_segments(&db).await.unwrap().is_empty());

        db.close().await.unwrap();
    }
}
