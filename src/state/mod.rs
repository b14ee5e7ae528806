//! State management module
//!
//! Timer entities, their pure transitions, the store that serializes them,
//! completion detection and the category view model.

pub mod collection;
pub mod completion;
pub mod notifications;
pub mod store;
pub mod timer;
pub mod view;

// Re-export main types
pub use collection::{BulkOperation, TimerAction, TimerCollection};
pub use completion::{NoticeKind, TimerNotice};
pub use notifications::NotificationQueue;
pub use store::{PersistenceChannels, TimerStore};
pub use timer::{HistoryEntry, NewTimer, Timer, TimerId, TimerStatus};
pub use view::{CategoryFilter, CategoryGroup, CategoryView};
