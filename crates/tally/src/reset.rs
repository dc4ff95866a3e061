// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tally reset-invalidations` command implementation.
//!
//! Only reset invalidations when you are certain they are no longer being
//! processed; resetting an active one leads to duplicated work and
//! inconsistent archives.

use chrono::Utc;
use clap::Args;

use tally_archive::{Reclaimer, ResetRequest, PREVIEW_ROW_LIMIT};
use tally_core::{Invalidation, TallyError};
use tally_storage::SqliteStore;

use crate::table::render_table;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Restrict the reset to invalidations assigned to the specified
    /// host. Can be used multiple times.
    #[arg(long = "processing-host")]
    pub processing_host: Vec<String>,

    /// Restrict the reset to invalidations for this site id. Can be used
    /// multiple times.
    #[arg(long = "idsite")]
    pub idsite: Vec<String>,

    /// Only reset invalidations started before the given time
    /// (e.g. "1 hour ago", "2024-01-01 12:00:00").
    #[arg(long = "older-than")]
    pub older_than: Option<String>,

    /// Only reset invalidations started after the given time
    /// (e.g. "2 days ago", "2024-02-01").
    #[arg(long = "newer-than")]
    pub newer_than: Option<String>,

    /// Show which invalidations would be reset without modifying them.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

const COLUMNS: [&str; 10] = [
    "name",
    "idsite",
    "report",
    "date1",
    "date2",
    "period",
    "ts_invalidated",
    "ts_started",
    "processing_host",
    "process_id",
];

/// Run the `tally reset-invalidations` command.
pub async fn run_reset(store: &SqliteStore, args: ResetArgs) -> Result<(), TallyError> {
    let request = ResetRequest {
        processing_hosts: args.processing_host,
        idsites: args.idsite,
        older_than: args.older_than,
        newer_than: args.newer_than,
    };
    // Relative time bounds anchor here, once, not per row.
    let filter = request.build_filter(Utc::now().naive_utc())?;

    let reclaimer = Reclaimer::new(store);

    if args.dry_run {
        let mut entries = reclaimer.preview(&filter).await?;
        if entries.is_empty() {
            println!("No invalidations found.");
            return Ok(());
        }
        println!("{} invalidations found:", entries.len());
        if entries.len() > PREVIEW_ROW_LIMIT {
            entries.truncate(PREVIEW_ROW_LIMIT);
            println!("Output limited to oldest {PREVIEW_ROW_LIMIT} records");
        }
        let rows: Vec<Vec<String>> = entries.iter().map(entry_to_row).collect();
        print!("{}", render_table(&COLUMNS, &rows));
    } else {
        let affected = reclaimer.reset(&filter).await?;
        println!("Number of invalidations that were reset: {affected}");
    }

    Ok(())
}

fn entry_to_row(entry: &Invalidation) -> Vec<String> {
    vec![
        entry.name.clone(),
        entry.idsite.to_string(),
        entry.report.clone().unwrap_or_default(),
        entry.date1.clone(),
        entry.date2.clone(),
        entry.period.to_string(),
        entry.ts_invalidated.clone(),
        entry.ts_started.clone().unwrap_or_default(),
        entry.processing_host.clone().unwrap_or_default(),
        entry.process_id.clone().unwrap_or_default(),
    ]
}
