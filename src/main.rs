//! Timer Board - countdown timers grouped by category
//!
//! This is the console host for the timer-board core.

use std::{io::BufRead, sync::Arc, thread};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{info, warn};

use timer_board::{
    api::{parse_command, responses::render_notice, Console, Reply},
    config::Config,
    services::{FileStore, PersistenceGateway, StdoutSink},
    state::TimerStore,
    tasks::{restore_history, restore_timers, spawn_persistence, Scheduler},
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_board={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting timer-board v1.0.0");
    info!(
        "Configuration: data_dir={}, tick={}ms",
        config.data_dir.display(),
        config.tick_millis
    );

    let gateway = PersistenceGateway::new(Arc::new(FileStore::new(&config.data_dir)));
    let (store, channels) = TimerStore::new(Arc::new(SystemClock));
    let store = Arc::new(store);
    let writers = spawn_persistence(channels, gateway.clone());

    // History first: restoring timers may record an unsaved completion
    match restore_history(&store, &gateway).await {
        Ok(count) => info!("Restored {} history entries", count),
        Err(e) => warn!("Starting with an empty history, could not load the saved one: {}", e),
    }

    // Restored timers are taken as-is; no time elapsed while stopped
    match restore_timers(&store, &gateway).await {
        Ok(count) => info!("Restored {} timers", count),
        Err(e) => warn!("Starting with no timers, could not load saved ones: {}", e),
    }

    let scheduler = Scheduler::new(config.tick_period());
    scheduler.start(store.clone());

    let mut notices = store.subscribe_notices();
    let mut console = Console::new(store.clone(), gateway, Arc::new(StdoutSink));
    let mut lines = spawn_stdin_reader();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    println!("Type `help` for commands.");

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => match console.handle(command).await {
                        Reply::Text(text) => println!("{}", text),
                        Reply::Quit => break,
                    },
                    Err(e) => println!("{}", e),
                }
            }

            notice = notices.recv() => match notice {
                Ok(notice) => println!("{}", render_notice(&notice)),
                Err(RecvError::Lagged(missed)) => warn!("Missed {} notifications", missed),
                Err(RecvError::Closed) => break,
            },

            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // Stop ticking, then let pending saves and history appends finish
    scheduler.shutdown().await;
    drop(console);
    drop(store);
    writers.join().await;

    info!("Shutdown complete");
    Ok(())
}

/// Read stdin on a plain thread so a pending read never holds up runtime shutdown
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}
