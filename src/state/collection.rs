//! Timer collection and its pure transitions
//!
//! Every transition consumes the current collection and returns the next one.
//! Unknown ids are silently ignored.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timer::{NewTimer, Timer, TimerId};

/// Operation applied to every eligible timer of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    Start,
    Pause,
    Reset,
}

impl FromStr for BulkOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(BulkOperation::Start),
            "pause" => Ok(BulkOperation::Pause),
            "reset" => Ok(BulkOperation::Reset),
            other => Err(format!("unknown bulk operation: {}", other)),
        }
    }
}

impl fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BulkOperation::Start => "start",
            BulkOperation::Pause => "pause",
            BulkOperation::Reset => "reset",
        };
        f.write_str(label)
    }
}

/// Every transition the store understands
#[derive(Debug, Clone, PartialEq)]
pub enum TimerAction {
    /// Replace the collection with persisted timers
    Load(Vec<Timer>),
    Add(NewTimer),
    Start(TimerId),
    Pause(TimerId),
    Reset(TimerId),
    Bulk {
        category: String,
        operation: BulkOperation,
    },
    Tick,
    MarkSaved(TimerId),
}

impl TimerAction {
    /// Short label used for logging and last-action tracking
    pub fn label(&self) -> &'static str {
        match self {
            TimerAction::Load(_) => "load",
            TimerAction::Add(_) => "add",
            TimerAction::Start(_) => "start",
            TimerAction::Pause(_) => "pause",
            TimerAction::Reset(_) => "reset",
            TimerAction::Bulk { .. } => "bulk",
            TimerAction::Tick => "tick",
            TimerAction::MarkSaved(_) => "mark-saved",
        }
    }
}

/// Ordered timers, insertion order preserved, ids unique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerCollection {
    timers: Vec<Timer>,
}

impl TimerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_timers(timers: Vec<Timer>) -> Self {
        Self { timers }
    }

    /// Persisted timers as the new baseline. Completed timers are past their
    /// midpoint already, so their halfway alert counts as shown.
    pub fn loaded(timers: Vec<Timer>) -> Self {
        Self::from_timers(timers).map(|timer| {
            if timer.is_completed() {
                timer.mark_halfway_shown()
            } else {
                timer
            }
        })
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn into_timers(self) -> Vec<Timer> {
        self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.timers.iter().find(|timer| &timer.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter()
    }

    /// Apply one action. Input for `Add` is validated before it gets here.
    pub fn apply(self, action: TimerAction, now: DateTime<Utc>) -> Self {
        match action {
            TimerAction::Load(timers) => Self::loaded(timers),
            TimerAction::Add(input) => self.add(input, now),
            TimerAction::Start(id) => self.start(&id),
            TimerAction::Pause(id) => self.pause(&id),
            TimerAction::Reset(id) => self.reset(&id),
            TimerAction::Bulk {
                category,
                operation,
            } => self.bulk(&category, operation),
            TimerAction::Tick => self.tick(now),
            TimerAction::MarkSaved(id) => self.mark_saved(&id),
        }
    }

    /// Append a paused timer whose id derives from `now`
    pub fn add(self, input: NewTimer, now: DateTime<Utc>) -> Self {
        self.add_with_id(input, now).0
    }

    /// Like [`TimerCollection::add`], also returning the id assigned
    pub fn add_with_id(mut self, input: NewTimer, now: DateTime<Utc>) -> (Self, TimerId) {
        let id = self.next_id(now);
        self.timers.push(Timer::new(id.clone(), input));
        (self, id)
    }

    pub fn start(self, id: &TimerId) -> Self {
        self.update(id, Timer::start)
    }

    pub fn pause(self, id: &TimerId) -> Self {
        self.update(id, Timer::pause)
    }

    pub fn reset(self, id: &TimerId) -> Self {
        self.update(id, Timer::reset)
    }

    /// Apply `operation` to every non-completed timer in `category`
    pub fn bulk(self, category: &str, operation: BulkOperation) -> Self {
        let transition: fn(Timer) -> Timer = match operation {
            BulkOperation::Start => Timer::start,
            BulkOperation::Pause => Timer::pause,
            BulkOperation::Reset => Timer::reset,
        };
        self.map(|timer| {
            if timer.category == category && !timer.is_completed() {
                transition(timer)
            } else {
                timer
            }
        })
    }

    /// Advance every running timer by one second
    pub fn tick(self, now: DateTime<Utc>) -> Self {
        self.map(|timer| timer.tick(now))
    }

    pub fn mark_saved(self, id: &TimerId) -> Self {
        self.update(id, Timer::mark_saved)
    }

    pub(crate) fn mark_halfway_shown(self, id: &TimerId) -> Self {
        self.update(id, Timer::mark_halfway_shown)
    }

    fn update(self, id: &TimerId, transition: impl Fn(Timer) -> Timer) -> Self {
        self.map(|timer| {
            if &timer.id == id {
                transition(timer)
            } else {
                timer
            }
        })
    }

    fn map(self, f: impl FnMut(Timer) -> Timer) -> Self {
        Self {
            timers: self.timers.into_iter().map(f).collect(),
        }
    }

    /// Creation time in milliseconds, bumped until no existing timer uses it
    fn next_id(&self, now: DateTime<Utc>) -> TimerId {
        let mut millis = now.timestamp_millis();
        loop {
            let candidate = TimerId::from_millis(millis);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            millis = millis.saturating_add(1);
        }
    }
}

impl<'a> IntoIterator for &'a TimerCollection {
    type Item = &'a Timer;
    type IntoIter = std::slice::Iter<'a, Timer>;

    fn into_iter(self) -> Self::IntoIter {
        self.timers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::timer::TimerStatus;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap()
    }

    fn input(name: &str, duration: i64, category: &str) -> NewTimer {
        NewTimer::new(name, duration, category).unwrap()
    }

    fn board() -> TimerCollection {
        TimerCollection::new()
            .add(input("Eggs", 5, "A"), at(0))
            .add(input("Rice", 4, "A"), at(0))
            .add(input("Run", 10, "B"), at(0))
    }

    fn ids(collection: &TimerCollection) -> Vec<TimerId> {
        collection.iter().map(|t| t.id.clone()).collect()
    }

    fn assert_bounds(collection: &TimerCollection) {
        for timer in collection {
            assert!(timer.remaining <= timer.duration, "{:?}", timer);
        }
    }

    #[test]
    fn add_keeps_insertion_order_and_unique_ids() {
        let collection = board();
        let names: Vec<_> = collection.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Eggs", "Rice", "Run"]);

        let mut unique = ids(&collection);
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0], TimerId::from_millis(at(0).timestamp_millis()));
        assert!(collection.iter().all(|t| t.status == TimerStatus::Paused));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let collection = board();
        let missing = TimerId::from("missing");
        let after = collection
            .clone()
            .start(&missing)
            .pause(&missing)
            .reset(&missing)
            .mark_saved(&missing);
        assert_eq!(after, collection);
    }

    #[test]
    fn start_is_idempotent() {
        let collection = board();
        let id = ids(&collection)[0].clone();
        let once = collection.start(&id);
        let twice = once.clone().start(&id);
        assert_eq!(once, twice);
        assert!(twice.get(&id).unwrap().is_running());
    }

    #[test]
    fn tick_n_times_counts_down_to_zero() {
        let collection = board();
        let id = ids(&collection)[1].clone();
        let mut collection = collection.start(&id);

        for n in 1..=6 {
            collection = collection.tick(at(n));
            assert_bounds(&collection);
            let timer = collection.get(&id).unwrap();
            assert_eq!(timer.remaining, 4u64.saturating_sub(n as u64));
            assert_eq!(timer.is_completed(), n >= 4);
        }
        assert_eq!(collection.get(&id).unwrap().completed_at, Some(at(4)));
    }

    #[test]
    fn tick_leaves_non_running_timers_alone() {
        let collection = board();
        let ticked = collection.clone().tick(at(1));
        assert_eq!(ticked, collection);
    }

    #[test]
    fn bulk_start_touches_only_category() {
        let collection = board().bulk("A", BulkOperation::Start);
        let statuses: Vec<_> = collection.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            [TimerStatus::Running, TimerStatus::Running, TimerStatus::Paused]
        );
    }

    #[test]
    fn bulk_skips_completed_timers() {
        let collection = TimerCollection::new()
            .add(input("Short", 1, "A"), at(0))
            .add(input("Long", 5, "A"), at(0));
        let short = ids(&collection)[0].clone();
        let collection = collection.start(&short).tick(at(1));
        let done = collection.get(&short).unwrap().clone();
        assert!(done.is_completed());

        for op in [BulkOperation::Start, BulkOperation::Pause, BulkOperation::Reset] {
            let after = collection.clone().bulk("A", op);
            assert_eq!(after.get(&short), Some(&done));
        }
    }

    #[test]
    fn bulk_reset_restores_running_timers() {
        let collection = board().bulk("A", BulkOperation::Start).tick(at(1)).tick(at(2));
        let collection = collection.bulk("A", BulkOperation::Reset);
        for timer in collection.iter().filter(|t| t.category == "A") {
            assert_eq!(timer.remaining, timer.duration);
            assert_eq!(timer.status, TimerStatus::Paused);
        }
    }

    #[test]
    fn reset_reopens_completed_timer() {
        let collection = TimerCollection::new().add(input("Tea", 1, "Kitchen"), at(0));
        let id = ids(&collection)[0].clone();
        let collection = collection.start(&id).tick(at(1)).mark_saved(&id);
        let timer = collection.reset(&id).get(&id).cloned().unwrap();
        assert_eq!(timer.remaining, 1);
        assert_eq!(timer.status, TimerStatus::Paused);
        assert!(!timer.completed_at_saved);
        assert_eq!(timer.completed_at, None);
    }

    #[test]
    fn apply_dispatches_actions() {
        let collection =
            TimerCollection::new().apply(TimerAction::Add(input("Tea", 3, "Kitchen")), at(0));
        let id = ids(&collection)[0].clone();
        let collection = collection
            .apply(TimerAction::Start(id.clone()), at(0))
            .apply(TimerAction::Tick, at(1));
        assert_eq!(collection.get(&id).unwrap().remaining, 2);

        let loaded = collection.clone().apply(TimerAction::Load(Vec::new()), at(2));
        assert!(loaded.is_empty());
    }

    #[test]
    fn load_marks_completed_timers_past_halfway() {
        let collection = TimerCollection::new()
            .add(input("Tea", 1, "Kitchen"), at(0))
            .add(input("Nap", 10, "Home"), at(0));
        let tea = ids(&collection)[0].clone();
        let mut timers = collection.start(&tea).tick(at(1)).into_timers();
        for timer in &mut timers {
            timer.halfway_alert_shown = false;
        }

        let loaded = TimerCollection::new().apply(TimerAction::Load(timers), at(2));
        let flags: Vec<_> = loaded.iter().map(|t| t.halfway_alert_shown).collect();
        assert_eq!(flags, [true, false]);
    }

    #[test]
    fn bulk_operation_parses_case_insensitively() {
        assert_eq!("Start".parse::<BulkOperation>(), Ok(BulkOperation::Start));
        assert_eq!("RESET".parse::<BulkOperation>(), Ok(BulkOperation::Reset));
        assert!("stop".parse::<BulkOperation>().is_err());
    }
}
