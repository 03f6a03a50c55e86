// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::RecurrenceType;

/// The schedule half of a recurring expense template: what repeats, from
/// when, until when. Day granularity throughout.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceRule {
    pub kind: RecurrenceType,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl RecurrenceRule {
    pub fn new(kind: RecurrenceType, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        RecurrenceRule { kind, start, end }
    }
}

/// Whether an occurrence of `rule` lands on `candidate`, honoring the
/// rule's end date.
pub fn is_active_on(rule: &RecurrenceRule, candidate: NaiveDate) -> bool {
    if let Some(end) = rule.end {
        if candidate > end {
            return false;
        }
    }
    is_active_ignoring_end(rule, candidate)
}

/// Same as [`is_active_on`] but without the end-date cutoff. Used when a
/// series' end date is being moved and candidates past the old end must
/// still match the schedule.
pub fn is_active_ignoring_end(rule: &RecurrenceRule, candidate: NaiveDate) -> bool {
    if candidate < rule.start {
        return false;
    }
    match rule.kind {
        RecurrenceType::None => false,
        RecurrenceType::Daily => true,
        RecurrenceType::Weekdays => {
            !matches!(candidate.weekday(), Weekday::Sat | Weekday::Sun)
        }
        RecurrenceType::Weekly => {
            candidate.weekday() == rule.start.weekday()
                && week_start(candidate) >= week_start(rule.start)
        }
        // Same day-of-month as the anchor. Anchors on day 29-31 simply
        // produce no occurrence in months without that day.
        RecurrenceType::Monthly => {
            candidate.day() == rule.start.day()
                && month_index(candidate) >= month_index(rule.start)
        }
    }
}

/// Active dates in `[from, to]` inclusive, honoring the rule's end date.
pub fn occurrence_dates(rule: &RecurrenceRule, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    collect_dates(rule, from, to, is_active_on)
}

/// Active dates in `[from, to]` inclusive, ignoring the rule's end date.
pub fn occurrence_dates_ignoring_end(
    rule: &RecurrenceRule,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    collect_dates(rule, from, to, is_active_ignoring_end)
}

fn collect_dates(
    rule: &RecurrenceRule,
    from: NaiveDate,
    to: NaiveDate,
    active: fn(&RecurrenceRule, NaiveDate) -> bool,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = from;
    while day <= to {
        if active(rule, day) {
            dates.push(day);
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    dates
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month() as i32 - 1
}
