// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurrence rule extraction ("every Sunday", "Tuesdays and Thursdays", "weekdays").

use std::sync::LazyLock;

use chrono::Weekday;
use regex::Regex;
use rota_core::RecurrenceRule;

use super::dates::parse_weekday;

const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

static DAILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(daily|every\s+day|each\s+day)\b").expect("Invalid regex"));

static WORKWEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:every\s+)?weekdays?\b").expect("Invalid regex"));

static WEEKEND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:every\s+)?weekends?\b").expect("Invalid regex"));

static EVERY_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:every|each)\s+((?:{WEEKDAYS})(?:\s*(?:,|and|&|\s)\s*(?:{WEEKDAYS}))*)"
    ))
    .expect("Invalid regex")
});

static PLURAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b({WEEKDAYS})s\b")).expect("Invalid regex"));

static DAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(WEEKDAYS).expect("Invalid regex"));

const WORKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Extracts a recurrence rule from `text` (already lowercased).
///
/// Days are kept in the order written, duplicates included, so a rule like
/// "every Sunday and Sunday" reaches the generator and is rejected there.
pub fn extract_recurrence(text: &str) -> Option<RecurrenceRule> {
    if DAILY.is_match(text) {
        return Some(RecurrenceRule::Daily);
    }

    let mut days: Vec<Weekday> = Vec::new();
    let mut covered = Vec::new();
    for caps in EVERY_LIST.captures_iter(text) {
        if let Some(list) = caps.get(1) {
            covered.push(list.range());
            days.extend(
                DAY_NAME
                    .find_iter(list.as_str())
                    .filter_map(|m| parse_weekday(m.as_str())),
            );
        }
    }
    for caps in PLURAL.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        if covered.iter().any(|r| r.contains(&m.start())) {
            continue;
        }
        if let Some(day) = parse_weekday(m.as_str()) {
            days.push(day);
        }
    }
    if !days.is_empty() {
        return Some(RecurrenceRule::Weekly(days));
    }

    if WORKWEEK.is_match(text) {
        return Some(RecurrenceRule::Weekly(WORKDAYS.to_vec()));
    }
    if WEEKEND.is_match(text) {
        return Some(RecurrenceRule::Weekly(vec![Weekday::Sat, Weekday::Sun]));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_single_day() {
        assert_eq!(
            extract_recurrence("every sunday in january"),
            Some(RecurrenceRule::Weekly(vec![Weekday::Sun]))
        );
    }

    #[test]
    fn lists_and_plurals() {
        assert_eq!(
            extract_recurrence("every tuesday and thursday"),
            Some(RecurrenceRule::Weekly(vec![Weekday::Tue, Weekday::Thu]))
        );
        assert_eq!(
            extract_recurrence("sundays and wednesdays in march"),
            Some(RecurrenceRule::Weekly(vec![Weekday::Sun, Weekday::Wed]))
        );
    }

    #[test]
    fn duplicates_are_preserved() {
        assert_eq!(
            extract_recurrence("every sunday and sunday"),
            Some(RecurrenceRule::Weekly(vec![Weekday::Sun, Weekday::Sun]))
        );
    }

    #[test]
    fn daily_and_named_sets() {
        assert_eq!(extract_recurrence("daily prayer"), Some(RecurrenceRule::Daily));
        assert_eq!(
            extract_recurrence("on weekends"),
            Some(RecurrenceRule::Weekly(vec![Weekday::Sat, Weekday::Sun]))
        );
        assert_eq!(
            extract_recurrence("every weekday"),
            Some(RecurrenceRule::Weekly(WORKDAYS.to_vec()))
        );
    }

    #[test]
    fn single_dates_are_not_recurrences() {
        assert_eq!(extract_recurrence("this sunday"), None);
    }
}
