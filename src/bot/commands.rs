//! Chat commands.

use crate::error::Result;
use crate::storage::{IdentityStore, SubscriberRegistry};

const GREETING: &str = "Hi! I send new IT job postings.\nCommands: /stop to unsubscribe, /status for status.";
const FAREWELL: &str = "You have unsubscribed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stop,
    Status,
}

impl Command {
    /// Parse the leading `/command` (optionally `/command@botname`) of a message.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = token.split_once('@').map_or(token, |(name, _)| name);

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "stop" => Some(Self::Stop),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Applies commands to the stores and builds replies.
#[derive(Clone)]
pub struct CommandHandler {
    subscribers: SubscriberRegistry,
    identity: IdentityStore,
    interval_secs: u64,
}

impl CommandHandler {
    pub fn new(subscribers: SubscriberRegistry, identity: IdentityStore, interval_secs: u64) -> Self {
        Self {
            subscribers,
            identity,
            interval_secs,
        }
    }

    /// Execute `command` for `sender` and return the reply text.
    pub fn handle(&self, sender: i64, command: Command) -> Result<String> {
        match command {
            Command::Start | Command::Help => {
                if self.subscribers.add(sender)? {
                    log::info!("Subscribed {}", sender);
                }
                Ok(GREETING.to_string())
            }
            Command::Stop => {
                if self.subscribers.remove(sender)? {
                    log::info!("Unsubscribed {}", sender);
                }
                Ok(FAREWELL.to_string())
            }
            Command::Status => Ok(format!(
                "Postings in database: {}\nInterval: {} min.",
                self.identity.count()?,
                self.interval_secs / 60
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /help please"), Some(Command::Help));
        assert_eq!(Command::parse("/stop@jobwatch_bot"), Some(Command::Stop));
        assert_eq!(Command::parse("/STATUS"), Some(Command::Status));
    }

    #[test]
    fn test_parse_ignores_other_text() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("start"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_start_and_stop() {
        let db = Database::open_in_memory().unwrap();
        let handler = CommandHandler::new(db.subscribers(), db.identity(), 900);

        assert_eq!(handler.handle(42, Command::Start).unwrap(), GREETING);
        handler.handle(42, Command::Help).unwrap();
        assert_eq!(db.subscribers().list().unwrap(), vec![42]);

        assert_eq!(handler.handle(42, Command::Stop).unwrap(), FAREWELL);
        assert!(db.subscribers().list().unwrap().is_empty());
    }

    #[test]
    fn test_status_reports_count_and_interval() {
        let db = Database::open_in_memory().unwrap();
        db.identity().seen("work.ua", "a", "t").unwrap();
        db.identity().seen("work.ua", "b", "t").unwrap();
        let handler = CommandHandler::new(db.subscribers(), db.identity(), 900);

        assert_eq!(
            handler.handle(1, Command::Status).unwrap(),
            "Postings in database: 2\nInterval: 15 min."
        );
    }
}
