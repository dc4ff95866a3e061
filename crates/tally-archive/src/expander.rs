// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure expansion of an invalidation request into the exhaustive set of
//! period instances to mark stale. No I/O happens here.
//!
//! Every emitted period drags its containment-filtered ancestors along
//! (invalidating a day always stales the containing week, month, and
//! year), and with cascading enabled the descendant instances are emitted
//! too, each again with its ancestors. The result is deduplicated across
//! the whole run and clamped to the site's creation date.

use std::collections::HashSet;

use tally_core::{Period, PeriodType, Site};

use crate::request::{DateSpec, DateSpecKind};

/// The base period instances one period type and one date specifier
/// produce, before any cascading: a single anchored period, or one
/// instance per calendar day for a non-Range type with a range specifier.
pub fn base_periods(period_type: PeriodType, spec: &DateSpec) -> Vec<Period> {
    match (period_type, spec.kind) {
        (PeriodType::Range, DateSpecKind::Range(date1, date2)) => {
            vec![Period::range(date1, date2)]
        }
        // Range with a single date is rejected during request parsing.
        (PeriodType::Range, DateSpecKind::Single(_)) => Vec::new(),
        (_, DateSpecKind::Single(anchor)) => vec![Period::containing(period_type, anchor)],
        (_, DateSpecKind::Range(date1, date2)) => {
            let mut periods: Vec<Period> = Vec::new();
            let mut day = date1;
            while day <= date2 {
                let period = Period::containing(period_type, day);
                if periods.last() != Some(&period) {
                    periods.push(period);
                }
                day = day.succ_opt().expect("date in range");
            }
            periods
        }
    }
}

/// Expand the full request for one site: base instances, their ancestors,
/// and (with `cascade`) their descendants with ancestors, deduplicated in
/// emission order. Periods ending before the site's creation date are
/// omitted.
pub fn expand_for_site(
    site: &Site,
    specs: &[DateSpec],
    period_types: &[PeriodType],
    cascade: bool,
) -> Vec<Period> {
    let mut emitted = Vec::new();
    let mut seen = HashSet::new();

    for period_type in period_types {
        for spec in specs {
            for base in base_periods(*period_type, spec) {
                if base.date2 < site.creation_date {
                    continue;
                }
                emit_with_ancestors(base, &mut emitted, &mut seen);
                if cascade {
                    for child in base.child_periods() {
                        if child.date2 < site.creation_date {
                            continue;
                        }
                        emit_with_ancestors(child, &mut emitted, &mut seen);
                    }
                }
            }
        }
    }

    emitted
}

fn emit_with_ancestors(period: Period, emitted: &mut Vec<Period>, seen: &mut HashSet<Period>) {
    if seen.insert(period) {
        emitted.push(period);
    }
    // An ancestor always contains the period, so it never fails the
    // creation-date clamp the period itself passed.
    for parent in period.parent_periods() {
        if seen.insert(parent) {
            emitted.push(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn site(creation: &str) -> Site {
        Site {
            idsite: 1,
            name: "test site".into(),
            main_url: None,
            creation_date: date(creation),
            timezone: "UTC".into(),
        }
    }

    fn single(s: &str) -> DateSpec {
        DateSpec {
            raw: s.to_string(),
            kind: DateSpecKind::Single(date(s)),
        }
    }

    fn range(a: &str, b: &str) -> DateSpec {
        DateSpec {
            raw: format!("{a},{b}"),
            kind: DateSpecKind::Range(date(a), date(b)),
        }
    }

    fn bounds(periods: &[Period], t: PeriodType) -> Vec<(String, String)> {
        periods
            .iter()
            .filter(|p| p.period_type == t)
            .map(|p| (p.date1.to_string(), p.date2.to_string()))
            .collect()
    }

    #[test]
    fn single_day_pulls_in_week_month_and_year() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[single("2012-01-01")],
            &[PeriodType::Day],
            false,
        );
        assert_eq!(periods.len(), 4);
        assert_eq!(
            bounds(&periods, PeriodType::Day),
            vec![("2012-01-01".into(), "2012-01-01".into())]
        );
        assert_eq!(
            bounds(&periods, PeriodType::Week),
            vec![("2011-12-26".into(), "2012-01-01".into())]
        );
        assert_eq!(
            bounds(&periods, PeriodType::Month),
            vec![("2012-01-01".into(), "2012-01-31".into())]
        );
        assert_eq!(
            bounds(&periods, PeriodType::Year),
            vec![("2012-01-01".into(), "2012-12-31".into())]
        );
    }

    #[test]
    fn contained_week_pulls_in_month_and_year() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[single("2012-01-08")],
            &[PeriodType::Week],
            false,
        );
        assert_eq!(periods.len(), 3);
        assert_eq!(
            bounds(&periods, PeriodType::Week),
            vec![("2012-01-02".into(), "2012-01-08".into())]
        );
    }

    #[test]
    fn week_across_years_does_not_cascade_up() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[single("2012-01-01")],
            &[PeriodType::Week],
            false,
        );
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].period_type, PeriodType::Week);
    }

    #[test]
    fn week_across_months_only_reaches_the_year() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[single("2012-01-31")],
            &[PeriodType::Week],
            false,
        );
        assert_eq!(periods.len(), 2);
        assert!(bounds(&periods, PeriodType::Month).is_empty());
        assert_eq!(
            bounds(&periods, PeriodType::Year),
            vec![("2012-01-01".into(), "2012-12-31".into())]
        );
    }

    #[test]
    fn day_range_expands_per_day_with_shared_ancestors() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[range("2012-01-01", "2012-01-12")],
            &[PeriodType::Day],
            false,
        );
        assert_eq!(bounds(&periods, PeriodType::Day).len(), 12);
        assert_eq!(
            bounds(&periods, PeriodType::Week),
            vec![
                ("2011-12-26".into(), "2012-01-01".into()),
                ("2012-01-02".into(), "2012-01-08".into()),
                ("2012-01-09".into(), "2012-01-15".into()),
            ]
        );
        assert_eq!(bounds(&periods, PeriodType::Month).len(), 1);
        assert_eq!(bounds(&periods, PeriodType::Year).len(), 1);
        assert_eq!(periods.len(), 17);
    }

    #[test]
    fn month_range_spec_yields_one_instance_per_month() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[range("2012-01-01", "2012-02-05")],
            &[PeriodType::Month],
            false,
        );
        assert_eq!(
            bounds(&periods, PeriodType::Month),
            vec![
                ("2012-01-01".into(), "2012-01-31".into()),
                ("2012-02-01".into(), "2012-02-29".into()),
            ]
        );
    }

    #[test]
    fn month_cascade_emits_days_weeks_and_the_boundary_week() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[single("2012-01-01")],
            &[PeriodType::Month],
            true,
        );
        assert_eq!(bounds(&periods, PeriodType::Day).len(), 31);
        // Five weeks start inside January; the week containing Jan 1
        // arrives through the first day's upward cascade.
        let weeks = bounds(&periods, PeriodType::Week);
        assert_eq!(weeks.len(), 6);
        assert!(weeks.contains(&("2011-12-26".into(), "2012-01-01".into())));
        assert!(weeks.contains(&("2012-01-30".into(), "2012-02-05".into())));
        // The boundary weeks never drag in December or February.
        assert_eq!(
            bounds(&periods, PeriodType::Month),
            vec![("2012-01-01".into(), "2012-01-31".into())]
        );
        assert_eq!(bounds(&periods, PeriodType::Year).len(), 1);
        assert_eq!(periods.len(), 39);
    }

    #[test]
    fn week_cascade_across_years_reaches_both_months_and_years() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[single("2012-01-01")],
            &[PeriodType::Week],
            true,
        );
        assert_eq!(bounds(&periods, PeriodType::Day).len(), 7);
        assert_eq!(bounds(&periods, PeriodType::Week).len(), 1);
        // The week itself cascades up to nothing, but its December days
        // reach December/2011 and its January day reaches January/2012.
        assert_eq!(
            bounds(&periods, PeriodType::Month),
            vec![
                ("2011-12-01".into(), "2011-12-31".into()),
                ("2012-01-01".into(), "2012-01-31".into()),
            ]
        );
        assert_eq!(
            bounds(&periods, PeriodType::Year),
            vec![
                ("2011-01-01".into(), "2011-12-31".into()),
                ("2012-01-01".into(), "2012-12-31".into()),
            ]
        );
        assert_eq!(periods.len(), 12);
    }

    #[test]
    fn cascade_never_reaches_before_site_creation() {
        // Site starts 2012-01-01; the week's December days are omitted.
        let periods = expand_for_site(
            &site("2012-01-01"),
            &[single("2012-01-01")],
            &[PeriodType::Week],
            true,
        );
        assert_eq!(
            bounds(&periods, PeriodType::Day),
            vec![("2012-01-01".into(), "2012-01-01".into())]
        );
        assert_eq!(bounds(&periods, PeriodType::Week).len(), 1);
        assert_eq!(
            bounds(&periods, PeriodType::Month),
            vec![("2012-01-01".into(), "2012-01-31".into())]
        );
        assert_eq!(
            bounds(&periods, PeriodType::Year),
            vec![("2012-01-01".into(), "2012-12-31".into())]
        );
        assert_eq!(periods.len(), 4);
    }

    #[test]
    fn base_period_entirely_before_creation_is_skipped() {
        let periods = expand_for_site(
            &site("2013-06-01"),
            &[single("2012-01-01")],
            &[PeriodType::Day, PeriodType::Week, PeriodType::Month],
            true,
        );
        assert!(periods.is_empty());
    }

    #[test]
    fn multiple_period_types_share_the_dedup_set() {
        let periods = expand_for_site(
            &site("2011-01-01"),
            &[single("2012-01-01")],
            &[PeriodType::Week, PeriodType::Year],
            false,
        );
        // Week crosses the year boundary, so only week + year appear and
        // the year is not duplicated by the explicit request.
        assert_eq!(periods.len(), 2);
    }

    #[test]
    fn range_periods_never_cascade() {
        let spec = range("2019-01-01", "2019-01-09");
        let periods = expand_for_site(&site("2011-01-01"), &[spec], &[PeriodType::Range], true);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].period_type, PeriodType::Range);
        assert_eq!(periods[0].date1, date("2019-01-01"));
        assert_eq!(periods[0].date2, date("2019-01-09"));
    }
}
