// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment token resolution against the stored segment catalog.
//!
//! A `--segment` token may be a stored segment's numeric id, its exact
//! name, or a raw definition string. Tokens that match nothing stored are
//! still honored as ad hoc definitions (after syntax validation); stored
//! segments scoped to other sites are skipped per site with a diagnostic,
//! never an error.

use tracing::warn;

use tally_core::{Segment, StoredSegment, TallyError};

use crate::events::DiagnosticEvent;

/// A segment ready for expansion: the canonical definition plus the
/// requested sites it does and does not apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSegment {
    pub segment: Segment,
    /// Requested sites the segment applies to, in request order.
    pub applicable_sites: Vec<i64>,
    /// Requested sites skipped because the stored segment is scoped
    /// elsewhere.
    pub skipped_sites: Vec<i64>,
}

/// Resolves segment tokens against a snapshot of the stored catalog.
/// The snapshot is taken once per run; configuration changes made while
/// a run executes are intentionally not observed.
pub struct SegmentResolver<'a> {
    stored: &'a [StoredSegment],
}

impl<'a> SegmentResolver<'a> {
    pub fn new(stored: &'a [StoredSegment]) -> SegmentResolver<'a> {
        SegmentResolver { stored }
    }

    /// The default segment set used when no `--segment` filter is given:
    /// "all visits" plus every auto-archived stored segment applicable to
    /// at least one requested site.
    pub fn default_set(
        &self,
        sites: &[i64],
        events: &mut Vec<DiagnosticEvent>,
    ) -> Vec<ResolvedSegment> {
        let mut resolved = vec![ResolvedSegment {
            segment: Segment::all_visits(),
            applicable_sites: sites.to_vec(),
            skipped_sites: Vec::new(),
        }];
        for stored in self.stored.iter().filter(|s| s.auto_archive) {
            if let Some(segment) = self.partition(&stored.definition, stored, sites, events) {
                resolved.push(segment);
            }
        }
        resolved
    }

    /// Resolve explicit `--segment` tokens. Unparsable definitions abort
    /// the request; everything else resolves, possibly with skipped sites.
    pub fn resolve_tokens(
        &self,
        tokens: &[String],
        sites: &[i64],
        events: &mut Vec<DiagnosticEvent>,
    ) -> Result<Vec<ResolvedSegment>, TallyError> {
        let mut resolved: Vec<ResolvedSegment> = Vec::new();
        for token in tokens {
            let candidate = self.resolve_token(token, sites, events)?;
            if let Some(candidate) = candidate {
                let duplicate = resolved
                    .iter()
                    .any(|r| r.segment.definition() == candidate.segment.definition());
                if !duplicate {
                    resolved.push(candidate);
                }
            }
        }
        Ok(resolved)
    }

    fn resolve_token(
        &self,
        token: &str,
        sites: &[i64],
        events: &mut Vec<DiagnosticEvent>,
    ) -> Result<Option<ResolvedSegment>, TallyError> {
        if token.is_empty() {
            return Ok(Some(ResolvedSegment {
                segment: Segment::all_visits(),
                applicable_sites: sites.to_vec(),
                skipped_sites: Vec::new(),
            }));
        }

        // Only stored segments visible to at least one requested site can
        // match; a segment scoped entirely to other sites is treated as
        // unmatched, same as an unknown name.
        let found = self
            .stored
            .iter()
            .filter(|s| sites.iter().any(|id| s.is_enabled_for(*id)))
            .find(|s| {
                s.idsegment.to_string() == token || s.name == token || s.definition == token
            });

        match found {
            Some(stored) => Ok(self.partition(&stored.definition, stored, sites, events)),
            None => {
                let message =
                    format!("'{token}' did not match any stored segment, but invalidating it anyway.");
                warn!("{message}");
                events.push(DiagnosticEvent::warning(message));

                let segment = Segment::parse(token)?;
                Ok(Some(ResolvedSegment {
                    segment,
                    applicable_sites: sites.to_vec(),
                    skipped_sites: Vec::new(),
                }))
            }
        }
    }

    /// Split the requested sites by applicability and emit the skip
    /// diagnostic when the segment does not cover all of them.
    fn partition(
        &self,
        definition: &str,
        stored: &StoredSegment,
        sites: &[i64],
        events: &mut Vec<DiagnosticEvent>,
    ) -> Option<ResolvedSegment> {
        let segment = match Segment::parse(definition) {
            Ok(segment) => segment,
            Err(err) => {
                // A stored definition that no longer parses is skipped,
                // not fatal; the catalog entry predates this run.
                warn!(segment = stored.name, "stored segment skipped: {err}");
                events.push(DiagnosticEvent::warning(format!(
                    "Stored segment '{}' has an invalid definition, skipping it.",
                    stored.name
                )));
                return None;
            }
        };

        let (applicable, skipped): (Vec<i64>, Vec<i64>) = sites
            .iter()
            .copied()
            .partition(|id| stored.is_enabled_for(*id));

        if !skipped.is_empty() {
            let message = format!(
                "Segment [{definition}] not available for all sites, skipping this segment for sites [ {} ].",
                format_ids(&skipped)
            );
            warn!("{message}");
            events.push(DiagnosticEvent::warning(message));
        }
        if applicable.is_empty() {
            return None;
        }

        Some(ResolvedSegment {
            segment,
            applicable_sites: applicable,
            skipped_sites: skipped,
        })
    }
}

/// Render a site id list the way the command output does: `1, 2, 3`.
pub fn format_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
