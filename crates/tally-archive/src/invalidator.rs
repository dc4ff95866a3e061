// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration of an invalidation request: validate, expand, and
//! either report (dry-run) or persist through the store.
//!
//! All validation happens before the first write. Persistence is one
//! idempotent upsert per key, so a run that fails halfway is safe to
//! re-run in full.

use std::collections::HashSet;

use tracing::{debug, info};

use tally_core::{ArchiveStore, InvalidationKey, Period, PeriodType, Site, TallyError};

use crate::events::DiagnosticEvent;
use crate::expander::{base_periods, expand_for_site};
use crate::request::{parse_date_specs, parse_periods, resolve_sites, DateSpec, PeriodSelection};
use crate::resolver::{format_ids, ResolvedSegment, SegmentResolver};

/// An invalidation request as received from the command layer, still in
/// raw string form. `invalidate` validates everything up front.
#[derive(Debug, Clone)]
pub struct InvalidationRequest {
    /// `all` or a comma-separated list of site ids.
    pub sites: String,
    /// Date specifiers: single dates or `date,date` ranges.
    pub dates: Vec<String>,
    /// `all` or a comma-separated list of period type names.
    pub periods: String,
    /// Segment tokens; empty means "all visits plus every applicable
    /// auto-archived stored segment".
    pub segments: Vec<String>,
    pub cascade: bool,
    pub plugin: Option<String>,
    pub dry_run: bool,
}

/// What an invalidation run produced: the diagnostic/trace events, the
/// expanded keys, and how many new queue rows were written (always 0 for
/// dry runs and for keys that already had a live row).
#[derive(Debug)]
pub struct InvalidationOutcome {
    pub events: Vec<DiagnosticEvent>,
    pub keys: Vec<InvalidationKey>,
    pub inserted: usize,
}

/// The entry point shared by the administrative command and the internal
/// scheduler.
pub struct Invalidator<'a> {
    store: &'a dyn ArchiveStore,
}

impl<'a> Invalidator<'a> {
    pub fn new(store: &'a dyn ArchiveStore) -> Invalidator<'a> {
        Invalidator { store }
    }

    pub async fn invalidate(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationOutcome, TallyError> {
        let selection = parse_periods(&request.periods)?;

        let explicit_range = matches!(
            &selection,
            PeriodSelection::Types(types) if types.contains(&PeriodType::Range)
        );
        let specs = parse_date_specs(&request.dates, explicit_range)?;

        let (period_types, all_mode) = match selection {
            PeriodSelection::Types(types) => (types, false),
            PeriodSelection::All => {
                let mut types = vec![
                    PeriodType::Day,
                    PeriodType::Week,
                    PeriodType::Month,
                    PeriodType::Year,
                ];
                // Range joins the expansion only when every specifier is a
                // range; otherwise it is silently dropped.
                if !specs.is_empty() && specs.iter().all(DateSpec::is_range) {
                    types.push(PeriodType::Range);
                }
                (types, true)
            }
        };

        // Catalogs are loaded once per run; concurrent configuration
        // changes are not observed past this point.
        let site_catalog = self.store.list_sites().await?;
        let site_ids = resolve_sites(&request.sites, &site_catalog)?;
        let target_sites: Vec<&Site> = site_ids
            .iter()
            .filter_map(|id| site_catalog.iter().find(|s| s.idsite == *id))
            .collect();

        let stored_segments = self.store.list_segments().await?;
        let resolver = SegmentResolver::new(&stored_segments);
        let mut events = Vec::new();
        let segments = if request.segments.is_empty() {
            resolver.default_set(&site_ids, &mut events)
        } else {
            resolver.resolve_tokens(&request.segments, &site_ids, &mut events)?
        };

        self.trace(request, &specs, &period_types, all_mode, &segments, &mut events);

        let site_periods: Vec<(i64, Vec<Period>)> = target_sites
            .iter()
            .map(|site| {
                (
                    site.idsite,
                    expand_for_site(site, &specs, &period_types, request.cascade),
                )
            })
            .collect();

        let mut keys = Vec::new();
        let mut seen = HashSet::new();
        for segment in &segments {
            let name = segment.segment.done_name(request.plugin.as_deref());
            for (idsite, periods) in &site_periods {
                if !segment.applicable_sites.contains(idsite) {
                    continue;
                }
                for period in periods {
                    let key = InvalidationKey {
                        name: name.clone(),
                        idsite: *idsite,
                        date1: period.date1,
                        date2: period.date2,
                        period: period.period_type,
                        report: None,
                    };
                    if seen.insert(key.clone()) {
                        keys.push(key);
                    }
                }
            }
        }
        debug!(keys = keys.len(), "expansion complete");

        let mut inserted = 0;
        if !request.dry_run {
            for key in &keys {
                if self.store.upsert_queued(key).await? {
                    inserted += 1;
                }
            }
            info!(inserted, expanded = keys.len(), "invalidations queued");
        }

        Ok(InvalidationOutcome {
            events,
            keys,
            inserted,
        })
    }

    /// Emit the human-readable trace lines: one per (period type x date
    /// specifier x segment), with the alternate phrasings for Range and
    /// for "all period types" requests.
    fn trace(
        &self,
        request: &InvalidationRequest,
        specs: &[DateSpec],
        period_types: &[PeriodType],
        all_mode: bool,
        segments: &[ResolvedSegment],
        events: &mut Vec<DiagnosticEvent>,
    ) {
        for period_type in period_types {
            if *period_type == PeriodType::Range {
                let overlapping = specs
                    .iter()
                    .map(|s| s.raw.as_str())
                    .collect::<Vec<_>>()
                    .join(";");
                for segment in segments {
                    events.push(DiagnosticEvent::info(format!(
                        "Invalidating range periods overlapping {overlapping} for site = [ {} ], segment = [ {} ]",
                        format_ids(&segment.applicable_sites),
                        segment.segment.definition(),
                    )));
                }
                continue;
            }

            for spec in specs {
                for segment in segments {
                    if all_mode {
                        events.push(DiagnosticEvent::info(format!(
                            "Invalidating {period_type} periods in {} for site = [ {} ], segment = [ {} ]",
                            spec.raw,
                            format_ids(&segment.applicable_sites),
                            segment.segment.definition(),
                        )));
                    } else if request.dry_run {
                        let dates = base_periods(*period_type, spec)
                            .iter()
                            .map(|p| p.date1.to_string())
                            .collect::<Vec<_>>()
                            .join(", ");
                        let mut line = format!(
                            "[Dry-run] invalidating archives for site = [ {} ], dates = [ {dates} ], period = [ {period_type} ], segment = [ {} ]",
                            format_ids(&segment.applicable_sites),
                            segment.segment.definition(),
                        );
                        if request.cascade {
                            line.push_str(", cascade = [ 1 ]");
                        }
                        if let Some(plugin) = &request.plugin {
                            line.push_str(&format!(", plugin = [ {plugin} ]"));
                        }
                        events.push(DiagnosticEvent::info(line));
                    }
                }
            }
        }
    }
}
