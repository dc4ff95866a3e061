// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery of invalidations stuck in the in-progress state after a
//! worker died without completing or releasing them.
//!
//! The filter is built once, resolving relative time expressions to
//! absolute timestamps at construction, and is shared verbatim between
//! the dry-run preview and the live reset so both address the same rows.

use chrono::NaiveDateTime;
use tracing::info;

use tally_core::{ArchiveStore, Invalidation, InvalidationFilter, TallyError};

use crate::timefilter::parse_time_expression;

/// How many rows a dry-run preview shows before truncating.
pub const PREVIEW_ROW_LIMIT: usize = 50;

/// Raw reset-invalidations options, before time resolution.
#[derive(Debug, Clone, Default)]
pub struct ResetRequest {
    pub processing_hosts: Vec<String>,
    pub idsites: Vec<String>,
    pub older_than: Option<String>,
    pub newer_than: Option<String>,
}

impl ResetRequest {
    /// Build the queue filter, anchoring relative expressions at `now`.
    /// The implicit `status = InProgress` predicate is always included.
    pub fn build_filter(&self, now: NaiveDateTime) -> Result<InvalidationFilter, TallyError> {
        let mut filter = InvalidationFilter::in_progress();
        filter.processing_hosts = self.processing_hosts.clone();

        for raw in &self.idsites {
            let id: i64 = raw
                .trim()
                .parse()
                .map_err(|_| TallyError::InvalidSiteList(raw.clone()))?;
            filter.idsites.push(id);
        }

        filter.started_after = self
            .newer_than
            .as_deref()
            .map(|raw| {
                parse_time_expression(raw, now).ok_or_else(|| TallyError::InvalidTimeFilter {
                    option: "newer-than".to_string(),
                })
            })
            .transpose()?;

        filter.started_before = self
            .older_than
            .as_deref()
            .map(|raw| {
                parse_time_expression(raw, now).ok_or_else(|| TallyError::InvalidTimeFilter {
                    option: "older-than".to_string(),
                })
            })
            .transpose()?;

        Ok(filter)
    }
}

/// Administrative recovery over the store.
pub struct Reclaimer<'a> {
    store: &'a dyn ArchiveStore,
}

impl<'a> Reclaimer<'a> {
    pub fn new(store: &'a dyn ArchiveStore) -> Reclaimer<'a> {
        Reclaimer { store }
    }

    /// All matching in-progress entries, oldest started first. The read
    /// takes no locks; workers keep claiming while an operator previews.
    pub async fn preview(
        &self,
        filter: &InvalidationFilter,
    ) -> Result<Vec<Invalidation>, TallyError> {
        self.store.find_by_filter(filter).await
    }

    /// Reset all matching entries to queued, clearing ownership, as a
    /// single atomic statement. Returns the affected row count.
    pub async fn reset(&self, filter: &InvalidationFilter) -> Result<usize, TallyError> {
        let affected = self.store.reset_matching(filter).await?;
        info!(affected, "stuck invalidations reset");
        Ok(affected)
    }
}
