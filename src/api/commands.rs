//! Console command parsing

use thiserror::Error;

use crate::state::{BulkOperation, CategoryFilter, TimerId};

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        name: String,
        duration: String,
        category: String,
    },
    Start(TimerId),
    Pause(TimerId),
    Reset(TimerId),
    Bulk {
        category: String,
        operation: BulkOperation,
    },
    List(Option<CategoryFilter>),
    Toggle(String),
    History,
    Export,
    Ack,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    BadOperation(String),
}

pub const HELP: &str = "\
add <name> <seconds> <category>   add a paused timer (name may contain spaces)
start|pause|reset <id>            control one timer
bulk <category> <start|pause|reset>
list [category|All]               show timers, optionally filtered
toggle <category>                 expand or collapse a category
history                           show completed timers, newest first
export                            print the history as JSON
ack                               dismiss the current completion notice
quit";

/// Parse a console line into a command
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (verb, args) = tokens.split_first().ok_or(CommandError::Empty)?;

    match (verb.to_lowercase().as_str(), args) {
        ("add", [name @ .., duration, category]) if !name.is_empty() => Ok(Command::Add {
            name: name.join(" "),
            duration: duration.to_string(),
            category: category.to_string(),
        }),
        ("add", _) => Err(CommandError::Usage("add <name> <seconds> <category>")),

        ("start", [id]) => Ok(Command::Start(TimerId::from(*id))),
        ("pause", [id]) => Ok(Command::Pause(TimerId::from(*id))),
        ("reset", [id]) => Ok(Command::Reset(TimerId::from(*id))),
        ("start" | "pause" | "reset", _) => Err(CommandError::Usage("start|pause|reset <id>")),

        ("bulk", [category, operation]) => Ok(Command::Bulk {
            category: category.to_string(),
            operation: operation.parse().map_err(CommandError::BadOperation)?,
        }),
        ("bulk", _) => Err(CommandError::Usage("bulk <category> <start|pause|reset>")),

        ("list", []) => Ok(Command::List(None)),
        ("list", filter) => Ok(Command::List(Some(CategoryFilter::parse(&filter.join(" "))))),

        ("toggle", category) if !category.is_empty() => Ok(Command::Toggle(category.join(" "))),
        ("toggle", _) => Err(CommandError::Usage("toggle <category>")),

        ("history", []) => Ok(Command::History),
        ("export", []) => Ok(Command::Export),
        ("ack", []) => Ok(Command::Ack),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit", []) => Ok(Command::Quit),

        (other, _) => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_joins_multi_word_names() {
        assert_eq!(
            parse_command("add Green tea 180 Kitchen"),
            Ok(Command::Add {
                name: "Green tea".to_string(),
                duration: "180".to_string(),
                category: "Kitchen".to_string(),
            })
        );
        assert_eq!(
            parse_command("add 180 Kitchen"),
            Err(CommandError::Usage("add <name> <seconds> <category>"))
        );
    }

    #[test]
    fn bulk_requires_known_operation() {
        assert_eq!(
            parse_command("bulk A start"),
            Ok(Command::Bulk {
                category: "A".to_string(),
                operation: BulkOperation::Start,
            })
        );
        assert!(matches!(
            parse_command("bulk A stop"),
            Err(CommandError::BadOperation(_))
        ));
    }

    #[test]
    fn list_takes_optional_filter() {
        assert_eq!(parse_command("list"), Ok(Command::List(None)));
        assert_eq!(
            parse_command("LIST all"),
            Ok(Command::List(Some(CategoryFilter::All)))
        );
        assert_eq!(
            parse_command("list Kitchen"),
            Ok(Command::List(Some(CategoryFilter::Only("Kitchen".to_string()))))
        );
    }

    #[test]
    fn rejects_blank_and_unknown_lines() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("delete 1"),
            Err(CommandError::Unknown("delete".to_string()))
        );
        assert_eq!(
            parse_command("start"),
            Err(CommandError::Usage("start|pause|reset <id>"))
        );
    }
}
