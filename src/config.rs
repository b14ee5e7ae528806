//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "timer-board")]
#[command(about = "Countdown timers grouped by category, with a completion history")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Directory holding the timers and history documents
    #[arg(short, long, default_value = "timer-data")]
    pub data_dir: PathBuf,

    /// Length of one tick in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_millis: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Scheduler period
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_tick_once_per_second() {
        let config = Config::try_parse_from(["timer-board"]).unwrap();
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.data_dir, PathBuf::from("timer-data"));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn flags_override_defaults() {
        let config =
            Config::try_parse_from(["timer-board", "-d", "/tmp/board", "--tick-millis", "250", "-v"])
                .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/board"));
        assert_eq!(config.tick_period(), Duration::from_millis(250));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn zero_tick_is_rejected() {
        assert!(Config::try_parse_from(["timer-board", "--tick-millis", "0"]).is_err());
    }
}
