// src/bot/poller.rs

//! Long-polling command loop.

use std::time::Duration;

use super::commands::{Command, CommandHandler};
use super::telegram::{TelegramClient, Update};

const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct CommandPoller {
    client: TelegramClient,
    handler: CommandHandler,
    poll_timeout_secs: u64,
}

impl CommandPoller {
    pub fn new(client: TelegramClient, handler: CommandHandler, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            handler,
            poll_timeout_secs,
        }
    }

    /// Poll for updates until the task is cancelled.
    pub async fn run(&self) {
        log::info!("Command poller started");
        let mut offset = 0;

        loop {
            let updates = match self.client.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    log::warn!("getUpdates failed: {}", e);
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                self.dispatch(&update).await;
            }
        }
    }

    async fn dispatch(&self, update: &Update) {
        let Some(message) = &update.message else {
            return;
        };
        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            return;
        };

        let sender = message.sender_id();
        log::debug!("{:?} from {}", command, sender);

        let reply = match self.handler.handle(sender, command) {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Failed to handle {:?} from {}: {}", command, sender, e);
                return;
            }
        };

        if let Err(e) = self.client.send_message(message.chat.id, &reply).await {
            log::warn!("Failed to reply to {}: {}", message.chat.id, e);
        }
    }
}
