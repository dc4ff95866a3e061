// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations for the archive invalidation table.
//!
//! Everything here is built so that concurrent workers can operate on the
//! queue without coordination beyond SQLite itself: inserts are idempotent
//! against live rows, and claims and resets are single conditional UPDATE
//! statements whose WHERE clause excludes rows another process got to first.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use tally_core::TallyError;

use crate::database::{map_tr_err, Database};
use crate::models::{Invalidation, InvalidationFilter, InvalidationKey, InvalidationStatus};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build the WHERE clause and binds for a filter. Shared between the
/// preview SELECT and the reset UPDATE so both address the same row set.
fn filter_clause(filter: &InvalidationFilter) -> (String, Vec<Value>) {
    let mut conditions = vec!["status = ?".to_string()];
    let mut binds: Vec<Value> = vec![Value::Integer(filter.status.as_i64())];

    if !filter.processing_hosts.is_empty() {
        let placeholders = vec!["?"; filter.processing_hosts.len()].join(", ");
        conditions.push(format!("processing_host IN ({placeholders})"));
        binds.extend(
            filter
                .processing_hosts
                .iter()
                .map(|h| Value::Text(h.clone())),
        );
    }

    if !filter.idsites.is_empty() {
        let placeholders = vec!["?"; filter.idsites.len()].join(", ");
        conditions.push(format!("idsite IN ({placeholders})"));
        binds.extend(filter.idsites.iter().map(|id| Value::Integer(*id)));
    }

    if let Some(after) = filter.started_after {
        conditions.push("ts_started > ?".to_string());
        binds.push(Value::Text(after.format(TS_FORMAT).to_string()));
    }

    if let Some(before) = filter.started_before {
        conditions.push("ts_started < ?".to_string());
        binds.push(Value::Text(before.format(TS_FORMAT).to_string()));
    }

    (conditions.join(" AND "), binds)
}

/// Ensure exactly one live queue entry exists for the logical key.
///
/// If an equivalent Queued or InProgress row already exists it is left
/// untouched; otherwise a new Queued row is inserted with
/// `ts_invalidated = now`. Returns whether a row was inserted.
pub async fn upsert_queued(db: &Database, key: &InvalidationKey) -> Result<bool, TallyError> {
    let key = key.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO archive_invalidation
                     (name, idsite, date1, date2, period, report, status, ts_invalidated)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, 0, strftime('%Y-%m-%d %H:%M:%S', 'now')
                 WHERE NOT EXISTS (
                     SELECT 1 FROM archive_invalidation
                     WHERE name = ?1 AND idsite = ?2 AND date1 = ?3 AND date2 = ?4
                       AND period = ?5 AND report IS ?6
                 )",
                params![
                    key.name,
                    key.idsite,
                    key.date1.format("%Y-%m-%d").to_string(),
                    key.date2.format("%Y-%m-%d").to_string(),
                    i64::from(key.period.ordinal()),
                    key.report,
                ],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Entries matching the filter, oldest `ts_started` first.
pub async fn find_by_filter(
    db: &Database,
    filter: &InvalidationFilter,
) -> Result<Vec<Invalidation>, TallyError> {
    let (clause, binds) = filter_clause(filter);
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT id, name, idsite, date1, date2, period, report, status,
                        ts_invalidated, ts_started, processing_host, process_id
                 FROM archive_invalidation
                 WHERE {clause}
                 ORDER BY ts_started ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(binds), row_to_invalidation)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

/// Atomically reset all matching rows back to Queued, clearing ownership.
///
/// A single conditional UPDATE; rows claimed or finished between a
/// preview and this call no longer match the status predicate and are
/// skipped rather than corrupted. Returns the number of rows affected.
pub async fn reset_matching(
    db: &Database,
    filter: &InvalidationFilter,
) -> Result<usize, TallyError> {
    let (clause, binds) = filter_clause(filter);
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "UPDATE archive_invalidation
                 SET status = 0, ts_started = NULL, processing_host = NULL, process_id = NULL
                 WHERE {clause}"
            );
            let affected = conn.execute(&sql, params_from_iter(binds))?;
            Ok(affected)
        })
        .await
        .map_err(map_tr_err)
}

/// Claim a queued entry for a worker: Queued -> InProgress with ownership
/// stamped. A single conditional UPDATE; returns `false` when another
/// worker already claimed the row (or it no longer exists).
pub async fn claim(
    db: &Database,
    id: i64,
    host: &str,
    process_id: &str,
) -> Result<bool, TallyError> {
    let host = host.to_string();
    let process_id = process_id.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE archive_invalidation
                 SET status = 1, ts_started = strftime('%Y-%m-%d %H:%M:%S', 'now'),
                     processing_host = ?2, process_id = ?3
                 WHERE id = ?1 AND status = 0",
                params![id, host, process_id],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Remove a finished entry. "Done" is the absence of the row.
pub async fn complete(db: &Database, id: i64) -> Result<(), TallyError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM archive_invalidation WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_invalidation(row: &rusqlite::Row<'_>) -> Result<Invalidation, rusqlite::Error> {
    let status_raw: i64 = row.get(7)?;
    let status = InvalidationStatus::from_i64(status_raw).ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(7, status_raw)
    })?;
    Ok(Invalidation {
        id: row.get(0)?,
        name: row.get(1)?,
        idsite: row.get(2)?,
        date1: row.get(3)?,
        date2: row.get(4)?,
        period: row.get(5)?,
        report: row.get(6)?,
        status,
        ts_invalidated: row.get(8)?,
        ts_started: row.get(9)?,
        processing_host: row.get(10)?,
        process_id: row.get(11)?,
    })
}
