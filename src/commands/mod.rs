//! Bot command handling.
//!
//! Provides command parsing and execution: the message-text side of the
//! bot, independent of the Telegram transport.

mod handler;
mod types;

pub use handler::{CommandHandler, extract_url};
pub use types::{BotCommand, CommandResult};
