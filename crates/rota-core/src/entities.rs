// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slot vocabulary shared by the entity resolver, the router, and handlers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate, Weekday};
use strum::{Display, EnumString};

use crate::types::{weekday_name, RoleCode};

/// Intents the router knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum IntentKind {
    CreateSchedule,
    AssignVolunteer,
    MyAssignments,
    Roster,
    ConfirmAssignment,
    DeclineAssignment,
    AssignmentStats,
    Reset,
    Unrecognized,
}

/// A named, typed field an intent handler may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Slot {
    User,
    Date,
    Role,
    Ministry,
    Recurrence,
}

/// Reference to a user as written in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    /// "me", "my", "I": the person sending the message.
    Speaker,
    /// A name as typed, matched against the directory by the repository.
    Named(String),
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRef::Speaker => f.write_str("you"),
            UserRef::Named(name) => f.write_str(name),
        }
    }
}

/// Reference to a ministry by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinistryRef(pub String);

impl fmt::Display for MinistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which dates inside a [`DateRange`]'s bounds belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Members {
    /// Every calendar day in the bounds. Never materialised, so a range of
    /// any length costs the same to hold, clone, and remember.
    Every,
    /// Sorted, unique dates inside the bounds.
    Only(Vec<NaiveDate>),
}

/// A resolved date expression: bounds plus the member dates.
///
/// Members are sorted, unique, and always inside `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
    members: Members,
}

impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self::span(date, date)
    }

    /// Every calendar day between `start` and `end` inclusive.
    ///
    /// A reversed range keeps its bounds but has no members, so callers can
    /// still report it as invalid.
    pub fn span(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            members: Members::Every,
        }
    }

    /// Bounds with an explicit member subset (e.g. "all Sundays in January").
    ///
    /// Members outside the bounds are dropped.
    pub fn within(
        start: NaiveDate,
        end: NaiveDate,
        members: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        let mut members: Vec<NaiveDate> = members
            .into_iter()
            .filter(|d| *d >= start && *d <= end)
            .collect();
        members.sort();
        members.dedup();
        Self {
            start,
            end,
            members: Members::Only(members),
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Member dates in ascending order, produced on demand.
    pub fn members(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let (every, only) = match &self.members {
            Members::Every => {
                let end = self.end;
                (Some(self.start.iter_days().take_while(move |d| *d <= end)), None)
            }
            Members::Only(dates) => (None, Some(dates.iter().copied())),
        };
        every.into_iter().flatten().chain(only.into_iter().flatten())
    }

    /// Number of member dates.
    pub fn len(&self) -> usize {
        match &self.members {
            Members::Every if self.is_reversed() => 0,
            Members::Every => {
                usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(usize::MAX)
            }
            Members::Only(dates) => dates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match &self.members {
            Members::Every => date >= self.start && date <= self.end,
            Members::Only(dates) => dates.binary_search(&date).is_ok(),
        }
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.nth(0)
    }

    pub fn last(&self) -> Option<NaiveDate> {
        match &self.members {
            Members::Every => (!self.is_reversed()).then_some(self.end),
            Members::Only(dates) => dates.last().copied(),
        }
    }

    pub fn nth(&self, index: usize) -> Option<NaiveDate> {
        match &self.members {
            Members::Every => self
                .start
                .checked_add_days(Days::new(u64::try_from(index).ok()?))
                .filter(|d| *d <= self.end),
            Members::Only(dates) => dates.get(index).copied(),
        }
    }

    /// The single concrete date, if this range names exactly one.
    pub fn as_single(&self) -> Option<NaiveDate> {
        (self.len() == 1).then(|| self.first()).flatten()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_single() {
            Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            None => write!(
                f,
                "{} to {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            ),
        }
    }
}

/// Which calendar dates inside a range a schedule covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// Every day in the range.
    Daily,
    /// The listed days of the week. A day listed twice is invalid.
    Weekly(Vec<Weekday>),
    /// An explicit list of dates. A date listed twice is invalid.
    Dates(Vec<NaiveDate>),
}

impl RecurrenceRule {
    /// Short description used in replies ("Sunday", "Tuesday and Thursday").
    pub fn day_label(&self) -> String {
        match self {
            RecurrenceRule::Daily => "day".to_string(),
            RecurrenceRule::Weekly(days) => {
                let names: Vec<&str> = days.iter().map(|d| weekday_name(*d)).collect();
                match names.as_slice() {
                    [] => String::new(),
                    [only] => (*only).to_string(),
                    [init @ .., last] => format!("{} and {}", init.join(", "), last),
                }
            }
            RecurrenceRule::Dates(_) => "selected date".to_string(),
        }
    }
}

/// A typed slot value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    User(UserRef),
    Date(DateRange),
    Role(RoleCode),
    Ministry(MinistryRef),
    Recurrence(RecurrenceRule),
}

impl SlotValue {
    pub fn slot(&self) -> Slot {
        match self {
            SlotValue::User(_) => Slot::User,
            SlotValue::Date(_) => Slot::Date,
            SlotValue::Role(_) => Slot::Role,
            SlotValue::Ministry(_) => Slot::Ministry,
            SlotValue::Recurrence(_) => Slot::Recurrence,
        }
    }
}

/// Where a resolved slot value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    /// Extracted from the current message.
    Message,
    /// Carried over from the conversation's last resolved entities.
    Memory,
    /// Found in one of the most recent raw messages.
    History,
}

/// Slot values resolved for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEntities {
    values: BTreeMap<Slot, (SlotValue, SlotSource)>,
}

impl ResolvedEntities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a slot, replacing any previous value.
    pub fn insert(&mut self, value: SlotValue, source: SlotSource) {
        self.values.insert(value.slot(), (value, source));
    }

    pub fn get(&self, slot: Slot) -> Option<&SlotValue> {
        self.values.get(&slot).map(|(v, _)| v)
    }

    pub fn source(&self, slot: Slot) -> Option<SlotSource> {
        self.values.get(&slot).map(|(_, s)| *s)
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.values.contains_key(&slot)
    }

    pub fn remove(&mut self, slot: Slot) -> Option<SlotValue> {
        self.values.remove(&slot).map(|(v, _)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotValue, SlotSource)> + '_ {
        self.values.values().map(|(v, s)| (v, *s))
    }

    /// Fills slots absent here from `other`; present slots are never replaced.
    pub fn fill_from(&mut self, other: &ResolvedEntities) {
        for (slot, entry) in &other.values {
            self.values.entry(*slot).or_insert_with(|| entry.clone());
        }
    }

    /// Overwrites slots here with every slot present in `other`.
    pub fn overwrite_with(&mut self, other: &ResolvedEntities) {
        for (slot, entry) in &other.values {
            self.values.insert(*slot, entry.clone());
        }
    }

    pub fn user(&self) -> Option<&UserRef> {
        match self.get(Slot::User) {
            Some(SlotValue::User(u)) => Some(u),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<&DateRange> {
        match self.get(Slot::Date) {
            Some(SlotValue::Date(d)) => Some(d),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<RoleCode> {
        match self.get(Slot::Role) {
            Some(SlotValue::Role(r)) => Some(*r),
            _ => None,
        }
    }

    pub fn ministry(&self) -> Option<&MinistryRef> {
        match self.get(Slot::Ministry) {
            Some(SlotValue::Ministry(m)) => Some(m),
            _ => None,
        }
    }

    pub fn recurrence(&self) -> Option<&RecurrenceRule> {
        match self.get(Slot::Recurrence) {
            Some(SlotValue::Recurrence(r)) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn intent_kind_round_trips_labels() {
        assert_eq!(IntentKind::from_str("assign_volunteer").unwrap(), IntentKind::AssignVolunteer);
        assert_eq!(IntentKind::CreateSchedule.to_string(), "create_schedule");
        assert!(IntentKind::from_str("order_pizza").is_err());
    }

    #[test]
    fn span_covers_every_day() {
        let range = DateRange::span(date(2024, 1, 30), date(2024, 2, 2));
        assert_eq!(range.len(), 4);
        assert_eq!(
            range.members().collect::<Vec<_>>(),
            vec![date(2024, 1, 30), date(2024, 1, 31), date(2024, 2, 1), date(2024, 2, 2)]
        );
        assert_eq!(range.first(), Some(date(2024, 1, 30)));
        assert_eq!(range.nth(2), Some(date(2024, 2, 1)));
        assert_eq!(range.nth(4), None);
        assert_eq!(range.last(), Some(date(2024, 2, 2)));
        assert!(range.contains(date(2024, 2, 1)));
        assert!(!range.contains(date(2024, 2, 3)));

        let reversed = DateRange::span(date(2024, 2, 2), date(2024, 1, 30));
        assert!(reversed.is_reversed());
        assert!(reversed.is_empty());
        assert_eq!(reversed.members().count(), 0);
        assert_eq!(reversed.first(), None);
        assert_eq!(reversed.last(), None);
    }

    #[test]
    fn huge_span_is_answered_from_its_bounds() {
        let range = DateRange::span(date(1, 1, 1), date(9999, 12, 31));
        assert_eq!(range.len(), 3_652_059);
        assert_eq!(range.nth(3_652_058), Some(date(9999, 12, 31)));
        assert!(range.contains(date(2024, 1, 7)));
        assert_eq!(range.as_single(), None);
        assert_eq!(range.clone(), range);
    }

    #[test]
    fn single_is_a_one_day_span() {
        let day = DateRange::single(date(2024, 1, 7));
        assert_eq!(day, DateRange::span(date(2024, 1, 7), date(2024, 1, 7)));
        assert_eq!(day.as_single(), Some(date(2024, 1, 7)));
    }

    #[test]
    fn within_filters_sorts_and_dedups() {
        let range = DateRange::within(
            date(2024, 1, 1),
            date(2024, 1, 31),
            [date(2024, 1, 14), date(2024, 1, 7), date(2024, 2, 4), date(2024, 1, 7)],
        );
        assert_eq!(range.members().collect::<Vec<_>>(), vec![date(2024, 1, 7), date(2024, 1, 14)]);
        assert!(range.contains(date(2024, 1, 14)));
        assert!(!range.contains(date(2024, 1, 21)));
        assert_eq!(range.as_single(), None);
    }

    #[test]
    fn fill_from_never_replaces_present_slots() {
        let mut current = ResolvedEntities::new();
        current.insert(SlotValue::User(UserRef::Named("Maria".into())), SlotSource::Message);

        let mut memory = ResolvedEntities::new();
        memory.insert(SlotValue::User(UserRef::Named("John".into())), SlotSource::Memory);
        memory.insert(SlotValue::Role(RoleCode::SoundTech), SlotSource::Memory);

        current.fill_from(&memory);
        assert_eq!(current.user(), Some(&UserRef::Named("Maria".into())));
        assert_eq!(current.source(Slot::User), Some(SlotSource::Message));
        assert_eq!(current.role(), Some(RoleCode::SoundTech));
    }

    #[test]
    fn recurrence_day_labels() {
        assert_eq!(RecurrenceRule::Weekly(vec![Weekday::Sun]).day_label(), "Sunday");
        assert_eq!(
            RecurrenceRule::Weekly(vec![Weekday::Tue, Weekday::Thu]).day_label(),
            "Tuesday and Thursday"
        );
        assert_eq!(RecurrenceRule::Daily.day_label(), "day");
    }

    proptest::proptest! {
        #[test]
        fn within_members_stay_sorted_and_bounded(
            offsets in proptest::collection::vec(0i64..120, 0..40),
            span in 0i64..90,
        ) {
            let start = date(2024, 1, 1);
            let end = start + chrono::Duration::days(span);
            let dates = offsets.iter().map(|o| start + chrono::Duration::days(*o));
            let range = DateRange::within(start, end, dates);
            let members: Vec<NaiveDate> = range.members().collect();
            for pair in members.windows(2) {
                proptest::prop_assert!(pair[0] < pair[1]);
            }
            for d in &members {
                proptest::prop_assert!(*d >= start && *d <= end);
            }
            proptest::prop_assert_eq!(members.len(), range.len());
        }
    }
}
