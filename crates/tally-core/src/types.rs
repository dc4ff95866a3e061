// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared domain types used across the store boundary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::period::PeriodType;

/// A measured website. Only the read side is modeled here; site
/// management happens elsewhere in the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub idsite: i64,
    pub name: String,
    pub main_url: Option<String>,
    /// Tracking start date; cascaded invalidations never reach before it.
    pub creation_date: NaiveDate,
    pub timezone: String,
}

/// A saved visitor segment from the segment catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSegment {
    pub idsegment: i64,
    pub name: String,
    pub definition: String,
    /// `None` means the segment is enabled for every site.
    pub enable_only_idsite: Option<i64>,
    /// Whether the segment participates in scheduled pre-archiving, and
    /// therefore in the default invalidation set.
    pub auto_archive: bool,
}

impl StoredSegment {
    /// Whether this segment applies to the given site.
    pub fn is_enabled_for(&self, idsite: i64) -> bool {
        match self.enable_only_idsite {
            None => true,
            Some(only) => only == idsite,
        }
    }
}

/// Queue entry status. "Done" is represented by deleting the row, not by
/// a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum InvalidationStatus {
    Queued = 0,
    InProgress = 1,
}

impl InvalidationStatus {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<InvalidationStatus> {
        match value {
            0 => Some(InvalidationStatus::Queued),
            1 => Some(InvalidationStatus::InProgress),
            _ => None,
        }
    }
}

/// The logical identity of a queue entry: what is stale, for which site,
/// over which period instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidationKey {
    pub name: String,
    pub idsite: i64,
    pub date1: NaiveDate,
    pub date2: NaiveDate,
    pub period: PeriodType,
    pub report: Option<String>,
}

/// One row of the invalidation queue as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub id: i64,
    pub name: String,
    pub idsite: i64,
    pub date1: String,
    pub date2: String,
    pub period: i64,
    pub report: Option<String>,
    pub status: InvalidationStatus,
    pub ts_invalidated: String,
    pub ts_started: Option<String>,
    pub processing_host: Option<String>,
    pub process_id: Option<String>,
}

/// Filter over queue entries, shared between the preview query and the
/// reset statement so both see the same row set. Relative time bounds
/// must be resolved to absolute timestamps before constructing this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationFilter {
    pub status: InvalidationStatus,
    pub idsites: Vec<i64>,
    pub processing_hosts: Vec<String>,
    pub started_after: Option<NaiveDateTime>,
    pub started_before: Option<NaiveDateTime>,
}

impl InvalidationFilter {
    /// A filter matching every in-progress entry.
    pub fn in_progress() -> InvalidationFilter {
        InvalidationFilter {
            status: InvalidationStatus::InProgress,
            idsites: Vec::new(),
            processing_hosts: Vec::new(),
            started_after: None,
            started_before: None,
        }
    }
}
