//! Pending completion notifications awaiting dismissal

use std::collections::VecDeque;

use super::completion::TimerNotice;

/// FIFO of undismissed notices; simultaneous completions are all kept
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: VecDeque<TimerNotice>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: TimerNotice) {
        self.pending.push_back(notice);
    }

    /// The notice currently on display
    pub fn current(&self) -> Option<&TimerNotice> {
        self.pending.front()
    }

    /// Dismiss the notice on display and return it
    pub fn dismiss(&mut self) -> Option<TimerNotice> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
