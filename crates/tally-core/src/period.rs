// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Period calendar: canonical date bounds per period type and the
//! parent/child relationships used by invalidation cascading.
//!
//! All functions here are pure. Cascading is asymmetric by design:
//! going up, a period only reaches an ancestor that fully contains it
//! (a week spanning two months never reaches either month); going down,
//! every finer-grained instance starting inside the range is enumerated,
//! boundary-crossing weeks included.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Period granularity, ordered finest to coarsest. Ordinals match the
/// values persisted in the `period` column of the invalidation queue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PeriodType {
    Day = 1,
    Week = 2,
    Month = 3,
    Year = 4,
    Range = 5,
}

/// Static metadata per period type: the ordinal stored in the queue and
/// whether the type participates in upward/downward cascading. Range
/// never cascades in either direction.
pub struct PeriodTypeMeta {
    pub period_type: PeriodType,
    pub ordinal: u8,
    pub cascades_up: bool,
    pub cascades_down: bool,
}

pub const PERIOD_TYPES: [PeriodTypeMeta; 5] = [
    PeriodTypeMeta {
        period_type: PeriodType::Day,
        ordinal: 1,
        cascades_up: true,
        cascades_down: true,
    },
    PeriodTypeMeta {
        period_type: PeriodType::Week,
        ordinal: 2,
        cascades_up: true,
        cascades_down: true,
    },
    PeriodTypeMeta {
        period_type: PeriodType::Month,
        ordinal: 3,
        cascades_up: true,
        cascades_down: true,
    },
    PeriodTypeMeta {
        period_type: PeriodType::Year,
        ordinal: 4,
        cascades_up: true,
        cascades_down: true,
    },
    PeriodTypeMeta {
        period_type: PeriodType::Range,
        ordinal: 5,
        cascades_up: false,
        cascades_down: false,
    },
];

impl PeriodType {
    /// The ordinal persisted in the `period` column.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Look up a period type by its persisted ordinal.
    pub fn from_ordinal(ordinal: i64) -> Option<PeriodType> {
        PERIOD_TYPES
            .iter()
            .find(|m| i64::from(m.ordinal) == ordinal)
            .map(|m| m.period_type)
    }

    fn meta(self) -> &'static PeriodTypeMeta {
        &PERIOD_TYPES[self.ordinal() as usize - 1]
    }
}

/// A concrete period instance with inclusive calendar bounds.
///
/// For Day/Week/Month/Year the bounds are always the calendar-canonical
/// ones for the period containing the anchor date; arbitrary bounds only
/// occur for Range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub period_type: PeriodType,
    pub date1: NaiveDate,
    pub date2: NaiveDate,
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = (date.year(), date.month());
    let next_month_start = if month == 12 {
        ymd(year + 1, 1, 1)
    } else {
        ymd(year, month + 1, 1)
    };
    next_month_start.pred_opt().expect("date in range")
}

impl Period {
    /// The canonical period of `period_type` containing `anchor`.
    ///
    /// Day: the anchor itself. Week: Monday-Sunday around the anchor.
    /// Month: first-last calendar day. Year: Jan 1 - Dec 31. Range has
    /// no calendar grid; the anchor day is returned.
    pub fn containing(period_type: PeriodType, anchor: NaiveDate) -> Period {
        let (date1, date2) = match period_type {
            PeriodType::Day | PeriodType::Range => (anchor, anchor),
            PeriodType::Week => {
                let start = week_start(anchor);
                (start, start + chrono::Duration::days(6))
            }
            PeriodType::Month => (ymd(anchor.year(), anchor.month(), 1), month_end(anchor)),
            PeriodType::Year => (ymd(anchor.year(), 1, 1), ymd(anchor.year(), 12, 31)),
        };
        Period {
            period_type,
            date1,
            date2,
        }
    }

    /// An arbitrary-bounds Range period.
    pub fn range(date1: NaiveDate, date2: NaiveDate) -> Period {
        Period {
            period_type: PeriodType::Range,
            date1,
            date2,
        }
    }

    /// Whether this period's bounds fully contain `other`'s.
    pub fn contains(&self, other: &Period) -> bool {
        self.date1 <= other.date1 && other.date2 <= self.date2
    }

    /// Every calendar day covered by this period, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut day = self.date1;
        while day <= self.date2 {
            days.push(day);
            day = day.succ_opt().expect("date in range");
        }
        days
    }

    /// Coarser periods this instance cascades up into.
    ///
    /// An ancestor is included only when it fully contains this period's
    /// bounds, so a week spanning two months produces neither month and a
    /// week spanning two years produces neither year. A day always lies
    /// inside its week, month, and year, so all three are returned for it.
    pub fn parent_periods(&self) -> Vec<Period> {
        if !self.period_type.meta().cascades_up {
            return Vec::new();
        }
        PERIOD_TYPES
            .iter()
            .filter(|m| m.cascades_up && m.ordinal > self.period_type.ordinal())
            .map(|m| Period::containing(m.period_type, self.date1))
            .filter(|candidate| candidate.contains(self))
            .collect()
    }

    /// Finer periods this instance cascades down into: every instance of
    /// every finer cascading type whose start date falls inside this
    /// period's bounds. Instances running past the end (a week starting
    /// in the last days of a month) are kept.
    pub fn child_periods(&self) -> Vec<Period> {
        if !self.period_type.meta().cascades_down {
            return Vec::new();
        }
        let mut children = Vec::new();
        for meta in PERIOD_TYPES
            .iter()
            .filter(|m| m.cascades_down && m.ordinal < self.period_type.ordinal())
        {
            let mut instance = Period::containing(meta.period_type, self.date1);
            if instance.date1 < self.date1 {
                instance = Period::containing(
                    meta.period_type,
                    instance.date2.succ_opt().expect("date in range"),
                );
            }
            while instance.date1 <= self.date2 {
                children.push(instance);
                instance = Period::containing(
                    meta.period_type,
                    instance.date2.succ_opt().expect("date in range"),
                );
            }
        }
        children
    }
}
