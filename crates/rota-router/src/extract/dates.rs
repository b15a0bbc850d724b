// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Date and date-range extraction.
//!
//! Relative terms are anchored on the `today` passed in, never on the wall
//! clock, so extraction is a pure function of its inputs.

use std::sync::LazyLock;

use chrono::{Datelike, Days, Month, NaiveDate, Weekday};
use regex::{Captures, Regex};
use rota_core::DateRange;

const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("Invalid regex"));

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({MONTHS})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s*(\d{{4}})\b)?"
    ))
    .expect("Invalid regex")
});

static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b(?:,?\s*(\d{{4}})\b)?"
    ))
    .expect("Invalid regex")
});

static RELATIVE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(today|tonight|tomorrow)\b").expect("Invalid regex"));

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:(every|this|next|on)\s+)?({WEEKDAYS})\b")).expect("Invalid regex")
});

static RELATIVE_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(this|next)\s+(week|month)\b").expect("Invalid regex"));

static WEEKDAYS_IN_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:(?:all|every|each)\s+(?:the\s+)?)?({WEEKDAYS})s?\s+(?:in|of|during)\s+({MONTHS})\b(?:\s+(\d{{4}})\b)?"
    ))
    .expect("Invalid regex")
});

static MONTH_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:(in|for|during|of|throughout)\s+)?({MONTHS})\b(?:\s+(\d{{4}})\b)?"
    ))
    .expect("Invalid regex")
});

static FROM_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:from|between)\s+(.+?)\s+(?:to|until|till|through|thru|and)\s+(.+)")
        .expect("Invalid regex")
});

static ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bthe\s+(first|second|third|fourth|fifth|last)\b").expect("Invalid regex")
});

pub(crate) fn parse_weekday(name: &str) -> Option<Weekday> {
    name.parse::<Weekday>().ok()
}

fn parse_month(name: &str) -> Option<u32> {
    name.parse::<Month>().ok().map(|m| m.number_from_month())
}

fn explicit_year(caps: &Captures<'_>, group: usize) -> Option<i32> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

/// A month named without a year is this year's, unless it is already over.
fn infer_year(today: NaiveDate, month: u32) -> i32 {
    if month < today.month() {
        today.year() + 1
    } else {
        today.year()
    }
}

pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// The first `day` on or after `from`.
fn on_or_after(from: NaiveDate, day: Weekday) -> NaiveDate {
    let ahead = (7 + day.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from + Days::new(u64::from(ahead))
}

fn month_day(caps: &Captures<'_>, month_group: usize, day_group: usize, today: NaiveDate) -> Option<NaiveDate> {
    let month = parse_month(caps.get(month_group)?.as_str())?;
    let day: u32 = caps.get(day_group)?.as_str().parse().ok()?;
    let year = explicit_year(caps, 3).unwrap_or_else(|| infer_year(today, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Finds the first single-day expression in `text` (already lowercased).
pub(crate) fn single_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(text) {
        let parsed = (|| {
            let y = caps.get(1)?.as_str().parse().ok()?;
            let m = caps.get(2)?.as_str().parse().ok()?;
            let d = caps.get(3)?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(y, m, d)
        })();
        if parsed.is_some() {
            return parsed;
        }
    }
    if let Some(date) = MONTH_DAY
        .captures(text)
        .and_then(|caps| month_day(&caps, 1, 2, today))
    {
        return Some(date);
    }
    if let Some(date) = DAY_MONTH
        .captures(text)
        .and_then(|caps| month_day(&caps, 2, 1, today))
    {
        return Some(date);
    }
    if let Some(caps) = RELATIVE_DAY.captures(text) {
        return match &caps[1] {
            "tomorrow" => today.succ_opt(),
            _ => Some(today),
        };
    }
    for caps in WEEKDAY.captures_iter(text) {
        let prefix = caps.get(1).map(|m| m.as_str());
        if prefix == Some("every") {
            continue;
        }
        let Some(day) = parse_weekday(&caps[2]) else {
            continue;
        };
        return Some(match prefix {
            Some("next") => on_or_after(today.succ_opt()?, day),
            _ => on_or_after(today, day),
        });
    }
    None
}

fn from_to(text: &str, today: NaiveDate) -> Option<DateRange> {
    let caps = FROM_TO.captures(text)?;
    let start = single_date(caps.get(1)?.as_str(), today)?;
    let end = single_date(caps.get(2)?.as_str(), today)?;
    Some(DateRange::span(start, end))
}

fn weekdays_in_month(text: &str, today: NaiveDate) -> Option<DateRange> {
    let caps = WEEKDAYS_IN_MONTH.captures(text)?;
    let day = parse_weekday(&caps[1])?;
    let month = parse_month(&caps[2])?;
    let year = explicit_year(&caps, 3).unwrap_or_else(|| infer_year(today, month));
    let (first, last) = month_bounds(year, month)?;
    let members = first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| d.weekday() == day);
    Some(DateRange::within(first, last, members))
}

fn relative_period(text: &str, today: NaiveDate) -> Option<DateRange> {
    let caps = RELATIVE_PERIOD.captures(text)?;
    let next = &caps[1] == "next";
    match &caps[2] {
        "week" => {
            let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
            let monday = if next { monday + Days::new(7) } else { monday };
            Some(DateRange::span(monday, monday + Days::new(6)))
        }
        _ => {
            let (year, month) = match (next, today.month()) {
                (false, m) => (today.year(), m),
                (true, 12) => (today.year() + 1, 1),
                (true, m) => (today.year(), m + 1),
            };
            let (first, last) = month_bounds(year, month)?;
            Some(DateRange::span(first, last))
        }
    }
}

fn month_only(text: &str, today: NaiveDate) -> Option<DateRange> {
    for caps in MONTH_ONLY.captures_iter(text) {
        let name = &caps[2];
        let year = explicit_year(&caps, 3);
        // "may" is usually the verb unless framed as a month.
        if name == "may" && caps.get(1).is_none() && year.is_none() {
            continue;
        }
        let Some(month) = parse_month(name) else {
            continue;
        };
        let year = year.unwrap_or_else(|| infer_year(today, month));
        let (first, last) = month_bounds(year, month)?;
        return Some(DateRange::span(first, last));
    }
    None
}

/// Extracts the most specific date expression in `text` (already lowercased).
pub fn extract_dates(text: &str, today: NaiveDate) -> Option<DateRange> {
    from_to(text, today)
        .or_else(|| weekdays_in_month(text, today))
        .or_else(|| relative_period(text, today))
        .or_else(|| single_date(text, today).map(DateRange::single))
        .or_else(|| month_only(text, today))
}

/// Index named by an ordinal reference ("the first one", "the last").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    Nth(usize),
    Last,
}

impl Ordinal {
    pub fn pick(self, range: &DateRange) -> Option<NaiveDate> {
        match self {
            Ordinal::Nth(i) => range.nth(i),
            Ordinal::Last => range.last(),
        }
    }
}

pub fn extract_ordinal(text: &str) -> Option<Ordinal> {
    let caps = ORDINAL.captures(text)?;
    Some(match &caps[1] {
        "first" => Ordinal::Nth(0),
        "second" => Ordinal::Nth(1),
        "third" => Ordinal::Nth(2),
        "fourth" => Ordinal::Nth(3),
        "fifth" => Ordinal::Nth(4),
        _ => Ordinal::Last,
    })
}
