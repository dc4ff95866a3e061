// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ArchiveStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use tally_config::model::StorageConfig;
use tally_core::types::{
    Invalidation, InvalidationFilter, InvalidationKey, Site, StoredSegment,
};
use tally_core::{ArchiveStore, TallyError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed archive store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`ArchiveStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not
    /// initialized.
    pub fn db(&self) -> Result<&Database, TallyError> {
        self.db.get().ok_or_else(|| TallyError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ArchiveStore for SqliteStore {
    async fn initialize(&self) -> Result<(), TallyError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TallyError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TallyError> {
        self.db()?.close().await
    }

    async fn list_sites(&self) -> Result<Vec<Site>, TallyError> {
        queries::sites::all_sites(self.db()?).await
    }

    async fn list_segments(&self) -> Result<Vec<StoredSegment>, TallyError> {
        queries::segments::all_segments(self.db()?).await
    }

    async fn upsert_queued(&self, key: &InvalidationKey) -> Result<bool, TallyError> {
        queries::invalidations::upsert_queued(self.db()?, key).await
    }

    async fn find_by_filter(
        &self,
        filter: &InvalidationFilter,
    ) -> Result<Vec<Invalidation>, TallyError> {
        queries::invalidations::find_by_filter(self.db()?, filter).await
    }

    async fn reset_matching(&self, filter: &InvalidationFilter) -> Result<usize, TallyError> {
        queries::invalidations::reset_matching(self.db()?, filter).await
    }

    async fn claim(&self, id: i64, host: &str, process_id: &str) -> Result<bool, TallyError> {
        queries::invalidations::claim(self.db()?, id, host, process_id).await
    }

    async fn complete(&self, id: i64) -> Result<(), TallyError> {
        queries::invalidations::complete(self.db()?, id).await
    }
}
