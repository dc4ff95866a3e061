// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed request values for the invalidation engine.
//!
//! The raw command options are parsed into these once, at the
//! orchestration boundary; everything past this point works with
//! validated values only.

use chrono::NaiveDate;

use tally_core::{PeriodType, Site, TallyError};

/// Which period granularities to invalidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSelection {
    /// `all`: every concrete type, plus Range when every date specifier
    /// is itself a range.
    All,
    /// An explicit list of period types, in request order.
    Types(Vec<PeriodType>),
}

/// Parse a `--periods` value: `all`, or a comma-separated list of period
/// names.
pub fn parse_periods(raw: &str) -> Result<PeriodSelection, TallyError> {
    if raw.trim() == "all" {
        return Ok(PeriodSelection::All);
    }
    let mut types = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        let period_type = token
            .parse::<PeriodType>()
            .map_err(|_| TallyError::InvalidPeriodType(token.to_string()))?;
        if !types.contains(&period_type) {
            types.push(period_type);
        }
    }
    if types.is_empty() {
        return Err(TallyError::InvalidPeriodType(raw.to_string()));
    }
    Ok(PeriodSelection::Types(types))
}

/// One `--dates` entry: a single anchor date or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSpec {
    /// The token as typed, used in trace lines and error messages.
    pub raw: String,
    pub kind: DateSpecKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpecKind {
    Single(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl DateSpec {
    pub fn is_range(&self) -> bool {
        matches!(self.kind, DateSpecKind::Range(..))
    }
}

/// Parse the `--dates` tokens.
///
/// With `require_ranges` (a Range period was explicitly requested) every
/// token must be a well-formed two-date range; violations surface as
/// `InvalidDateRange`. Otherwise single dates and ranges are both
/// accepted, and only a token with more than two dates is a range error.
pub fn parse_date_specs(
    raws: &[String],
    require_ranges: bool,
) -> Result<Vec<DateSpec>, TallyError> {
    let mut specs = Vec::new();
    for raw in raws {
        specs.push(parse_date_spec(raw, require_ranges)?);
    }
    Ok(specs)
}

fn parse_date_spec(raw: &str, require_range: bool) -> Result<DateSpec, TallyError> {
    let tokens: Vec<&str> = raw.split(',').collect();
    let kind = match tokens.as_slice() {
        [single] => {
            if require_range {
                return Err(TallyError::InvalidDateRange(raw.to_string()));
            }
            DateSpecKind::Single(parse_date(single, raw)?)
        }
        [first, second] => {
            let (date1, date2) = if require_range {
                let date1 = parse_date(first, raw)
                    .map_err(|_| TallyError::InvalidDateRange(raw.to_string()))?;
                let date2 = parse_date(second, raw)
                    .map_err(|_| TallyError::InvalidDateRange(raw.to_string()))?;
                (date1, date2)
            } else {
                (parse_date(first, raw)?, parse_date(second, raw)?)
            };
            if date1 > date2 {
                return Err(TallyError::InvalidDateSpecifier(raw.to_string()));
            }
            DateSpecKind::Range(date1, date2)
        }
        // More than two boundary dates is a malformed range, whatever the
        // requested period types.
        _ => return Err(TallyError::InvalidDateRange(raw.to_string())),
    };
    Ok(DateSpec {
        raw: raw.to_string(),
        kind,
    })
}

fn parse_date(token: &str, raw: &str) -> Result<NaiveDate, TallyError> {
    NaiveDate::parse_from_str(token.trim(), "%Y-%m-%d")
        .map_err(|_| TallyError::InvalidDateSpecifier(raw.to_string()))
}

/// Resolve a `--sites` value against the site catalog: `all`, or a
/// comma-separated list of known site ids. The resolved list keeps the
/// request order (catalog order for `all`) and never contains duplicates.
pub fn resolve_sites(raw: &str, known: &[Site]) -> Result<Vec<i64>, TallyError> {
    if raw.trim() == "all" {
        return Ok(known.iter().map(|s| s.idsite).collect());
    }
    let mut ids = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        let id: i64 = token
            .parse()
            .map_err(|_| TallyError::InvalidSiteList(raw.to_string()))?;
        if id <= 0 || !known.iter().any(|s| s.idsite == id) {
            return Err(TallyError::InvalidSiteList(raw.to_string()));
        }
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Err(TallyError::InvalidSiteList(raw.to_string()));
    }
    Ok(ids)
}
