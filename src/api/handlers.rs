//! Console command handlers

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{
    commands::{Command, HELP},
    responses::{render_groups, render_history, render_notice},
};
use crate::{
    services::{ExportSink, PersistenceGateway},
    state::{CategoryView, NewTimer, TimerId, TimerStore},
};

/// Result of handling one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}

/// Presentation-side state for one console session
pub struct Console {
    store: Arc<TimerStore>,
    gateway: PersistenceGateway,
    sink: Arc<dyn ExportSink>,
    view: CategoryView,
}

impl Console {
    pub fn new(store: Arc<TimerStore>, gateway: PersistenceGateway, sink: Arc<dyn ExportSink>) -> Self {
        Self {
            store,
            gateway,
            sink,
            view: CategoryView::new(),
        }
    }

    pub fn view(&self) -> &CategoryView {
        &self.view
    }

    /// Execute a parsed command against the store
    pub async fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Add {
                name,
                duration,
                category,
            } => match NewTimer::parse(&name, &duration, &category) {
                Ok(input) => {
                    let category = input.category().to_string();
                    let id = self.store.add(input);
                    // New categories start expanded so the timer is visible
                    if !self.view.is_expanded(&category) {
                        self.view.toggle(&category);
                    }
                    Reply::text(format!("Added timer {}", id))
                }
                Err(e) => {
                    warn!("Rejected add command: {}", e);
                    Reply::text(format!("Cannot add timer: {}", e))
                }
            },
            Command::Start(id) => self.single(&id, "Started", |store, id| {
                store.start_timer(id);
            }),
            Command::Pause(id) => self.single(&id, "Paused", |store, id| {
                store.pause_timer(id);
            }),
            Command::Reset(id) => self.single(&id, "Reset", |store, id| {
                store.reset_timer(id);
            }),
            Command::Bulk {
                category,
                operation,
            } => {
                let timers = self.store.bulk_action(&category, operation);
                let affected = timers
                    .iter()
                    .filter(|t| t.category == category && !t.is_completed())
                    .count();
                Reply::text(format!("Bulk {} applied to {} timers in {}", operation, affected, category))
            }
            Command::List(filter) => {
                if let Some(filter) = filter {
                    self.view.select(filter);
                }
                let timers = self.store.timers();
                Reply::text(format!(
                    "Filter: {}\n{}",
                    self.view.filter(),
                    render_groups(&self.view.groups(&timers))
                ))
            }
            Command::Toggle(category) => {
                let expanded = self.view.toggle(&category);
                Reply::text(format!(
                    "{} {}",
                    if expanded { "Expanded" } else { "Collapsed" },
                    category
                ))
            }
            Command::History => Reply::text(render_history(&self.store.history())),
            Command::Export => match self.gateway.export_history(self.sink.as_ref()).await {
                Ok(()) => {
                    info!("History exported");
                    Reply::text("History exported")
                }
                Err(e) => {
                    error!("Export failed: {}", e);
                    Reply::text(format!("Export failed: {}", e))
                }
            },
            Command::Ack => match self.store.dismiss_notification() {
                Some(notice) => {
                    let next = self
                        .store
                        .current_notification()
                        .map(|n| format!("\n{}", render_notice(&n)))
                        .unwrap_or_default();
                    Reply::text(format!("Dismissed: {}{}", notice.name, next))
                }
                None => Reply::text("No pending notifications"),
            },
            Command::Help => Reply::text(HELP),
            Command::Quit => Reply::Quit,
        }
    }

    fn single(&self, id: &TimerId, verb: &str, action: impl FnOnce(&TimerStore, &TimerId)) -> Reply {
        if self.store.timer(id).is_none() {
            return Reply::text(format!("No timer with id {}", id));
        }
        action(&self.store, id);
        match self.store.timer(id) {
            Some(timer) => Reply::text(format!("{} {}: {} {}", verb, timer.name, timer.status, timer.formatted_remaining())),
            None => Reply::text(format!("No timer with id {}", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::commands::parse_command,
        error::ExportError,
        services::MemoryStore,
        tasks::{restore_history, spawn_persistence, Tick},
        utils::clock::FixedClock,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingSink(Mutex<Vec<String>>);

    #[async_trait]
    impl ExportSink for CapturingSink {
        async fn share(&self, _title: &str, message: &str) -> Result<(), ExportError> {
            self.0.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    async fn run(console: &mut Console, line: &str) -> String {
        match console.handle(parse_command(line).unwrap()).await {
            Reply::Text(text) => text,
            Reply::Quit => "<quit>".to_string(),
        }
    }

    #[tokio::test]
    async fn session_runs_timer_to_history() {
        let clock = Arc::new(FixedClock::new(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()));
        let (store, channels) = TimerStore::new(clock.clone());
        let store = Arc::new(store);
        let gateway = PersistenceGateway::new(Arc::new(MemoryStore::new()));
        let writers = spawn_persistence(channels, gateway.clone());
        let sink = Arc::new(CapturingSink::default());
        let mut console = Console::new(store.clone(), gateway.clone(), sink.clone());

        assert_eq!(run(&mut console, "add Tea 2 Kitchen").await, "Added timer 1700000000000");
        assert!(run(&mut console, "add Tea x Kitchen").await.starts_with("Cannot add timer"));
        assert_eq!(run(&mut console, "start 42").await, "No timer with id 42");
        assert_eq!(
            run(&mut console, "bulk Kitchen start").await,
            "Bulk start applied to 1 timers in Kitchen"
        );
        assert!(run(&mut console, "list").await.contains("RUNNING"));

        clock.advance(1);
        store.tick();
        clock.advance(1);
        store.tick();
        assert_eq!(
            run(&mut console, "ack").await,
            "Dismissed: Tea"
        );
        assert_eq!(run(&mut console, "ack").await, "No pending notifications");

        drop(console);
        drop(store);
        writers.join().await;

        let history = gateway.load_history().await.unwrap();
        assert_eq!(history.len(), 1);

        let restored = Arc::new(TimerStore::new(clock).0);
        assert_eq!(restore_history(&restored, &gateway).await.unwrap(), 1);
        let mut console = Console::new(restored, gateway, sink.clone());
        assert!(run(&mut console, "history").await.starts_with("Tea  completed at"));
        assert_eq!(run(&mut console, "export").await, "History exported");
        assert!(sink.0.lock().unwrap()[0].contains("\"name\": \"Tea\""));
        assert_eq!(run(&mut console, "quit").await, "<quit>");
    }

    #[tokio::test]
    async fn list_filter_and_toggle_drive_view() {
        let clock = Arc::new(FixedClock::new(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()));
        let (store, _channels) = TimerStore::new(clock);
        let gateway = PersistenceGateway::new(Arc::new(MemoryStore::new()));
        let mut console = Console::new(Arc::new(store), gateway, Arc::new(CapturingSink::default()));

        run(&mut console, "add Tea 60 Kitchen").await;
        run(&mut console, "add Run 600 Gym").await;
        assert_eq!(run(&mut console, "toggle Gym").await, "Collapsed Gym");

        let text = run(&mut console, "list Gym").await;
        assert!(text.starts_with("Filter: Gym\n> Gym"));
        assert!(!text.contains("Kitchen"));
        assert_eq!(console.view().filter().to_string(), "Gym");
    }
}
