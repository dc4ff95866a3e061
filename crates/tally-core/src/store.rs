// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The store trait the invalidation engine depends on.

use async_trait::async_trait;

use crate::error::TallyError;
use crate::types::{Invalidation, InvalidationFilter, InvalidationKey, Site, StoredSegment};

/// Access to the persistent queue and the site/segment catalogs.
///
/// Implementations must provide the atomicity the queue contract relies
/// on: `claim` and `reset_matching` are single conditional statements, so
/// a row claimed concurrently is excluded rather than corrupted, and
/// `upsert_queued` never produces a second live row for the same key.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Open connections and run migrations. Must be called once before
    /// any other operation.
    async fn initialize(&self) -> Result<(), TallyError>;

    /// Flush and release the underlying store.
    async fn close(&self) -> Result<(), TallyError>;

    /// All known sites.
    async fn list_sites(&self) -> Result<Vec<Site>, TallyError>;

    /// All live (non-deleted) stored segments.
    async fn list_segments(&self) -> Result<Vec<StoredSegment>, TallyError>;

    /// Ensure exactly one live queue entry exists for the key. Returns
    /// `true` when a new row was inserted, `false` when an equivalent
    /// live row already existed and was left untouched.
    async fn upsert_queued(&self, key: &InvalidationKey) -> Result<bool, TallyError>;

    /// Entries matching the filter, oldest `ts_started` first.
    async fn find_by_filter(
        &self,
        filter: &InvalidationFilter,
    ) -> Result<Vec<Invalidation>, TallyError>;

    /// Atomically reset all matching in-progress entries back to queued,
    /// clearing ownership. Returns the number of rows affected.
    async fn reset_matching(&self, filter: &InvalidationFilter) -> Result<usize, TallyError>;

    /// Claim a queued entry for a worker. Returns `false` without error
    /// when the entry was already claimed or removed.
    async fn claim(&self, id: i64, host: &str, process_id: &str) -> Result<bool, TallyError>;

    /// Remove a finished entry from the queue.
    async fn complete(&self, id: i64) -> Result<(), TallyError>;
}
