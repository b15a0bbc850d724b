// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schedule generator: recurrence rule + date range -> occurrences.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use rota_core::{
    Ministry, RecurrenceRule, ScheduleError, ScheduleId, ScheduleOccurrence, weekday_name,
};
use tracing::debug;

/// Rejects rules that would emit the same date twice or nothing at all.
pub fn validate_recurrence(rule: &RecurrenceRule) -> Result<(), ScheduleError> {
    match rule {
        RecurrenceRule::Daily => Ok(()),
        RecurrenceRule::Weekly(days) => {
            if days.is_empty() {
                return Err(ScheduleError::InvalidRecurrence {
                    detail: "no days of the week given".into(),
                });
            }
            let mut seen = BTreeSet::new();
            for day in days {
                if !seen.insert(day.num_days_from_monday()) {
                    return Err(ScheduleError::InvalidRecurrence {
                        detail: format!("{} is listed more than once", weekday_name(*day)),
                    });
                }
            }
            Ok(())
        }
        RecurrenceRule::Dates(dates) => {
            if dates.is_empty() {
                return Err(ScheduleError::InvalidRecurrence {
                    detail: "no dates given".into(),
                });
            }
            let mut seen = BTreeSet::new();
            for date in dates {
                if !seen.insert(*date) {
                    return Err(ScheduleError::InvalidRecurrence {
                        detail: format!("{date} is listed more than once"),
                    });
                }
            }
            Ok(())
        }
    }
}

fn matches(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    match rule {
        RecurrenceRule::Daily => true,
        RecurrenceRule::Weekly(days) => days.contains(&date.weekday()),
        RecurrenceRule::Dates(dates) => dates.contains(&date),
    }
}

/// Expands `rule` over `[start, end]` for `ministry`.
///
/// Fails before emitting anything if the range is reversed, the ministry is
/// inactive, or the rule is malformed. The output is ascending by date and
/// depends only on the arguments, so regenerating is idempotent.
pub fn generate(
    ministry: &Ministry,
    schedule_id: &ScheduleId,
    start: NaiveDate,
    end: NaiveDate,
    rule: &RecurrenceRule,
) -> Result<Vec<ScheduleOccurrence>, ScheduleError> {
    if end < start {
        return Err(ScheduleError::InvalidRange { start, end });
    }
    if !ministry.can_create_schedule() {
        return Err(ScheduleError::InactiveMinistry {
            ministry: ministry.name.clone(),
        });
    }
    validate_recurrence(rule)?;

    let occurrences: Vec<ScheduleOccurrence> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| matches(rule, *d))
        .map(|d| ScheduleOccurrence::new(schedule_id.clone(), ministry.id.clone(), d))
        .collect();

    debug!(
        ministry = %ministry.name,
        %start,
        %end,
        count = occurrences.len(),
        "generated occurrences"
    );
    Ok(occurrences)
}

/// Human title for a schedule: "Worship - January 2024" for a range inside
/// one month, otherwise "Worship - 2024-01-01 to 2024-02-15".
pub fn schedule_title(ministry: &Ministry, start: NaiveDate, end: NaiveDate) -> String {
    if start.year() == end.year() && start.month() == end.month() {
        format!("{} - {}", ministry.name, start.format("%B %Y"))
    } else {
        format!("{} - {start} to {end}", ministry.name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use rota_core::MinistryId;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn worship(active: bool) -> Ministry {
        Ministry {
            id: MinistryId::from("m-worship"),
            name: "Worship".into(),
            leader: None,
            is_active: active,
        }
    }

    #[test]
    fn reversed_range_is_rejected_first() {
        let err = generate(
            &worship(false),
            &ScheduleId::from("s"),
            date(2024, 2, 1),
            date(2024, 1, 1),
            &RecurrenceRule::Weekly(vec![]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvalidRange {
                start: date(2024, 2, 1),
                end: date(2024, 1, 1)
            }
        );
    }

    #[test]
    fn inactive_ministry_is_rejected() {
        let err = generate(
            &worship(false),
            &ScheduleId::from("s"),
            date(2024, 1, 1),
            date(2024, 1, 31),
            &RecurrenceRule::Daily,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "ministry `Worship` is inactive");
    }

    #[test]
    fn duplicate_weekday_fails_fast() {
        let err = validate_recurrence(&RecurrenceRule::Weekly(vec![Weekday::Sun, Weekday::Sun]))
            .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvalidRecurrence {
                detail: "Sunday is listed more than once".into()
            }
        );
    }

    #[test]
    fn duplicate_and_empty_dates_are_rejected() {
        assert!(validate_recurrence(&RecurrenceRule::Dates(vec![])).is_err());
        assert!(
            validate_recurrence(&RecurrenceRule::Dates(vec![date(2024, 1, 7), date(2024, 1, 7)]))
                .is_err()
        );
    }

    #[test]
    fn explicit_dates_outside_range_are_dropped() {
        let out = generate(
            &worship(true),
            &ScheduleId::from("s"),
            date(2024, 1, 1),
            date(2024, 1, 31),
            &RecurrenceRule::Dates(vec![date(2024, 2, 4), date(2024, 1, 21), date(2024, 1, 7)]),
        )
        .unwrap();
        let dates: Vec<_> = out.iter().map(|o| o.date()).collect();
        assert_eq!(dates, vec![date(2024, 1, 7), date(2024, 1, 21)]);
    }

    #[test]
    fn daily_single_day_range() {
        let out = generate(
            &worship(true),
            &ScheduleId::from("s"),
            date(2024, 1, 3),
            date(2024, 1, 3),
            &RecurrenceRule::Daily,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].day_label(), "Wednesday");
    }

    #[test]
    fn titles() {
        let m = worship(true);
        assert_eq!(schedule_title(&m, date(2024, 1, 1), date(2024, 1, 31)), "Worship - January 2024");
        assert_eq!(
            schedule_title(&m, date(2024, 1, 1), date(2024, 2, 15)),
            "Worship - 2024-01-01 to 2024-02-15"
        );
    }
}
