// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Site catalog reads plus the seed insert used by provisioning and tests.

use chrono::NaiveDate;
use rusqlite::params;
use tally_core::TallyError;

use crate::database::{map_tr_err, Database};
use crate::models::Site;

/// Insert a site row. The platform's site management owns updates and
/// deletions; this crate only ever seeds and reads.
pub async fn insert_site(db: &Database, site: &Site) -> Result<(), TallyError> {
    let site = site.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO site (idsite, name, main_url, ts_created, timezone)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    site.idsite,
                    site.name,
                    site.main_url,
                    format!("{} 00:00:00", site.creation_date.format("%Y-%m-%d")),
                    site.timezone,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All known sites, ordered by id.
pub async fn all_sites(db: &Database) -> Result<Vec<Site>, TallyError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT idsite, name, main_url, ts_created, timezone
                 FROM site ORDER BY idsite",
            )?;
            let rows = stmt.query_map([], row_to_site)?;
            let mut sites = Vec::new();
            for row in rows {
                sites.push(row?);
            }
            Ok(sites)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a single site by id.
pub async fn get_site(db: &Database, idsite: i64) -> Result<Option<Site>, TallyError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT idsite, name, main_url, ts_created, timezone
                 FROM site WHERE idsite = ?1",
            )?;
            match stmt.query_row(params![idsite], row_to_site) {
                Ok(site) => Ok(Some(site)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_site(row: &rusqlite::Row<'_>) -> Result<Site, rusqlite::Error> {
    let ts_created: String = row.get(3)?;
    Ok(Site {
        idsite: row.get(0)?,
        name: row.get(1)?,
        main_url: row.get(2)?,
        creation_date: parse_creation_date(3, &ts_created)?,
        timezone: row.get(4)?,
    })
}

/// `ts_created` holds a `YYYY-MM-DD HH:MM:SS` timestamp; only the date
/// part matters for invalidation clamping.
fn parse_creation_date(idx: usize, raw: &str) -> Result<NaiveDate, rusqlite::Error> {
    let date_part = &raw[..raw.len().min(10)];
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
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

    fn make_site(idsite: i64, created: &str) -> Site {
        Site {
            idsite,
            name: format!("site {idsite}"),
            main_url: Some(format!("https://site{idsite}.example")),
            creation_date: created.parse().unwrap(),
            timezone: "UTC".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_list_sites() {
        let (db, _dir) = setup_db().await;

        insert_site(&db, &make_site(1, "2011-01-01")).await.unwrap();
        insert_site(&db, &make_site(2, "2012-01-02")).await.unwrap();

        let sites = all_sites(&db).await.unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].idsite, 1);
        assert_eq!(sites[0].creation_date, "2011-01-01".parse().unwrap());
        assert_eq!(sites[1].creation_date, "2012-01-02".parse().unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_site_returns_none_for_unknown_id() {
        let (db, _dir) = setup_db().await;

        insert_site(&db, &make_site(1, "2011-01-01")).await.unwrap();

        assert!(get_site(&db, 1).await.unwrap().is_some());
        assert!(get_site(&db, 500).await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
