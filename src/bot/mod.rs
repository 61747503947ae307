//! Telegram side of the bot: message transport and the chat command surface.

mod commands;
mod poller;
mod telegram;

pub use commands::{Command, CommandHandler};
pub use poller::CommandPoller;
pub use telegram::{Chat, Message, TelegramClient, Update, User};
