//! Completion and halfway detection
//!
//! Runs on every new collection the store produces. Each completed timer is
//! turned into exactly one history entry and marked saved within the same
//! transition, so re-running the detector never records it twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    collection::TimerCollection,
    timer::{HistoryEntry, TimerId},
};

/// What a notice reports about a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Halfway,
    Completed,
}

/// Notification surfaced to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerNotice {
    pub kind: NoticeKind,
    pub id: TimerId,
    pub name: String,
}

/// Everything the detector found in one pass
#[derive(Debug, Default, PartialEq)]
pub struct Detection {
    /// New history entries, in collection order
    pub history: Vec<HistoryEntry>,
    /// Halfway and completion notices, halfway first per timer
    pub notices: Vec<TimerNotice>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.notices.is_empty()
    }
}

/// Scan for unrecorded completions and unannounced halfway points.
///
/// Returns the collection with the matching flags set, plus what was found.
pub fn detect(collection: TimerCollection, now: DateTime<Utc>) -> (TimerCollection, Detection) {
    let mut detection = Detection::default();
    let mut halfway = Vec::new();
    let mut completed = Vec::new();

    for timer in &collection {
        if timer.needs_halfway_alert() {
            halfway.push(timer.id.clone());
            detection.notices.push(TimerNotice {
                kind: NoticeKind::Halfway,
                id: timer.id.clone(),
                name: timer.name.clone(),
            });
        }
        if timer.needs_history_entry() {
            completed.push(timer.id.clone());
            detection.history.push(HistoryEntry::for_timer(timer, now));
            detection.notices.push(TimerNotice {
                kind: NoticeKind::Completed,
                id: timer.id.clone(),
                name: timer.name.clone(),
            });
        }
    }

    let collection = halfway
        .iter()
        .fold(collection, |acc, id| acc.mark_halfway_shown(id));
    let collection = completed
        .iter()
        .fold(collection, |acc, id| acc.mark_saved(id));

    (collection, detection)
}
