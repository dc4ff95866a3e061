// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invalidation scheduling and queue-management engine.
//!
//! Expands a human-specified set of sites, dates, periods, and segments
//! into the full set of stale-archive queue entries (with hierarchical
//! cascading between period granularities), drives the queue through the
//! store, and recovers entries stuck in progress after worker crashes.

pub mod events;
pub mod expander;
pub mod invalidator;
pub mod reclaimer;
pub mod request;
pub mod resolver;
pub mod timefilter;

pub use events::{DiagnosticEvent, Severity};
pub use invalidator::{InvalidationOutcome, InvalidationRequest, Invalidator};
pub use reclaimer::{Reclaimer, ResetRequest, PREVIEW_ROW_LIMIT};
