// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tally invalidate` command implementation.

use clap::Args;

use tally_archive::{InvalidationRequest, Invalidator};
use tally_core::TallyError;
use tally_storage::SqliteStore;

#[derive(Args, Debug)]
pub struct InvalidateArgs {
    /// Site ids to invalidate: "all" or a comma-separated list.
    #[arg(long)]
    pub sites: String,

    /// Date (YYYY-MM-DD) or date range (YYYY-MM-DD,YYYY-MM-DD) to
    /// invalidate. Can be used multiple times.
    #[arg(long = "dates", required = true)]
    pub dates: Vec<String>,

    /// Period types to invalidate: a comma-separated subset of
    /// day,week,month,year,range, or "all".
    #[arg(long, default_value = "day")]
    pub periods: String,

    /// Also invalidate every coarser and finer period covering the same
    /// days.
    #[arg(long)]
    pub cascade: bool,

    /// Segment to invalidate: a stored segment's id, name, or a raw
    /// definition. Can be used multiple times. Without this option the
    /// "all visits" archives plus every applicable auto-archived stored
    /// segment are invalidated.
    #[arg(long = "segment")]
    pub segments: Vec<String>,

    /// Restrict the invalidation to a single plugin's archives.
    #[arg(long)]
    pub plugin: Option<String>,

    /// Compute and report what would be invalidated without persisting
    /// anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Run the `tally invalidate` command.
pub async fn run_invalidate(store: &SqliteStore, args: InvalidateArgs) -> Result<(), TallyError> {
    let request = InvalidationRequest {
        sites: args.sites,
        dates: args.dates,
        periods: args.periods,
        segments: args.segments,
        cascade: args.cascade,
        plugin: args.plugin,
        dry_run: args.dry_run,
    };

    let invalidator = Invalidator::new(store);
    let outcome = invalidator.invalidate(&request).await?;

    for event in &outcome.events {
        println!("{}", event.message);
    }
    if !request.dry_run {
        println!("Marked {} archive(s) as invalidated.", outcome.inserted);
    }
    Ok(())
}
