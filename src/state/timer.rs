//! Timer entity and history entry structures

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque timer identity, derived from the creation time in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    /// Build an id from a creation timestamp in milliseconds
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TimerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Paused,
    Running,
    Completed,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimerStatus::Paused => "paused",
            TimerStatus::Running => "running",
            TimerStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Validated input for a new timer.
///
/// Only [`NewTimer::new`] and [`NewTimer::parse`] build one:
///
/// ```compile_fail
/// let input = timer_board::state::NewTimer {
///     name: String::new(),
///     duration: 0,
///     category: String::new(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimer {
    name: String,
    duration: u64,
    category: String,
}

impl NewTimer {
    /// Validate name, duration (seconds) and category.
    ///
    /// Name and category are trimmed; whitespace-only values are rejected.
    pub fn new(name: &str, duration: i64, category: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let category = category.trim();

        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        let duration = u64::try_from(duration)
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ValidationError::NonPositiveDuration(duration))?;

        Ok(Self {
            name: name.to_string(),
            duration,
            category: category.to_string(),
        })
    }

    /// Validate raw form input where the duration is still text
    pub fn parse(name: &str, duration: &str, category: &str) -> Result<Self, ValidationError> {
        let secs = duration
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidDuration(duration.to_string()))?;
        Self::new(name, secs, category)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Countdown length in seconds, always positive
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

/// A named countdown owned by the timer collection.
///
/// Field names follow the persisted JSON contract (camelCase). Transition
/// methods consume the timer and return its next version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub duration: u64,
    pub remaining: u64,
    pub category: String,
    pub status: TimerStatus,
    #[serde(default)]
    pub halfway_alert_shown: bool,
    #[serde(default)]
    pub completed_at_saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Timer {
    /// Create a paused timer with a full countdown
    pub fn new(id: TimerId, input: NewTimer) -> Self {
        Self {
            id,
            name: input.name,
            duration: input.duration,
            remaining: input.duration,
            category: input.category,
            status: TimerStatus::Paused,
            halfway_alert_shown: false,
            completed_at_saved: false,
            completed_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == TimerStatus::Completed
    }

    /// Completed but not yet written to the history log
    pub fn needs_history_entry(&self) -> bool {
        self.is_completed() && !self.completed_at_saved
    }

    /// Crossed the midpoint of its countdown without an alert yet
    pub fn needs_halfway_alert(&self) -> bool {
        !self.halfway_alert_shown
            && self.status != TimerStatus::Paused
            && self.remaining.saturating_mul(2) <= self.duration
    }

    pub(crate) fn start(self) -> Self {
        if self.is_completed() {
            return self;
        }
        Self {
            status: TimerStatus::Running,
            ..self
        }
    }

    pub(crate) fn pause(self) -> Self {
        if self.is_completed() {
            return self;
        }
        Self {
            status: TimerStatus::Paused,
            ..self
        }
    }

    pub(crate) fn reset(self) -> Self {
        Self {
            remaining: self.duration,
            status: TimerStatus::Paused,
            halfway_alert_shown: false,
            completed_at_saved: false,
            completed_at: None,
            ..self
        }
    }

    /// Advance one second. Only running timers move.
    pub(crate) fn tick(self, now: DateTime<Utc>) -> Self {
        if !self.is_running() {
            return self;
        }
        match self.remaining.saturating_sub(1) {
            0 => Self {
                remaining: 0,
                status: TimerStatus::Completed,
                completed_at: self.completed_at.or(Some(now)),
                ..self
            },
            remaining => Self { remaining, ..self },
        }
    }

    pub(crate) fn mark_saved(self) -> Self {
        Self {
            completed_at_saved: true,
            ..self
        }
    }

    pub(crate) fn mark_halfway_shown(self) -> Self {
        Self {
            halfway_alert_shown: true,
            ..self
        }
    }

    /// Remaining time as `MM:SS`
    pub fn formatted_remaining(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }

    /// Elapsed share of the countdown in percent, within `[0, 100]`
    pub fn progress_percent(&self) -> f64 {
        if self.duration == 0 {
            return 100.0;
        }
        let left = self.remaining.min(self.duration) as f64 / self.duration as f64;
        (1.0 - left) * 100.0
    }
}

/// One recorded completion in the history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: TimerId,
    pub name: String,
    pub completed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Record a completed timer, falling back to `now` when the timer carries no timestamp
    pub fn for_timer(timer: &Timer, now: DateTime<Utc>) -> Self {
        Self {
            id: timer.id.clone(),
            name: timer.name.clone(),
            completed_at: timer.completed_at.unwrap_or(now),
        }
    }
}
