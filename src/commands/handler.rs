//! Command handler implementation.
//!
//! Turns incoming message or inline-query text into a reply: parses slash
//! commands, extracts URLs from free-form text, calls the shortener client,
//! and renders results as plain text. Every path produces a reply; failures
//! never propagate past this layer.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::types::{BotCommand, CommandResult};
use crate::bot::BotStats;
use crate::config::ShortenerConfig;
use crate::shortener::{ShortenerClient, validate_url};

/// Usage hint shown when a message contains no URL.
const USAGE_HINT: &str = "Send me a link starting with http:// or https:// \
                          and I will shorten it. Try /help for more.";

/// Handles bot commands and free-form messages.
pub struct CommandHandler {
    /// Shortener HTTP client.
    shortener: Arc<ShortenerClient>,

    /// Provider configuration, for the `/status` reply.
    config: ShortenerConfig,

    /// Shared request counters.
    stats: Arc<RwLock<BotStats>>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(
        shortener: Arc<ShortenerClient>,
        config: ShortenerConfig,
        stats: Arc<RwLock<BotStats>>,
    ) -> Self {
        Self {
            shortener,
            config,
            stats,
        }
    }

    /// Handles the text of a direct message.
    ///
    /// Commands are executed; any other text is scanned for a URL to
    /// shorten. Text without a URL gets the usage hint and triggers no
    /// shortener call.
    pub async fn handle_text(&self, text: &str) -> CommandResult {
        if let Some(command) = BotCommand::parse(text) {
            debug!("Handling command: {}", command);
            return self.execute(command).await;
        }

        match extract_url(text) {
            Some(url) => self.shorten_reply(&url).await,
            None => CommandResult::success(USAGE_HINT),
        }
    }

    /// Handles an inline query string.
    ///
    /// The query is treated like message text without command parsing.
    pub async fn handle_inline(&self, query: &str) -> CommandResult {
        match extract_url(query) {
            Some(url) => self.shorten_reply(&url).await,
            None => CommandResult::error(USAGE_HINT),
        }
    }

    /// Executes a parsed command.
    async fn execute(&self, command: BotCommand) -> CommandResult {
        match command {
            BotCommand::Start => Self::handle_start(),
            BotCommand::Help => Self::handle_help(),
            BotCommand::Shorten(Some(arg)) => self.shorten_reply(&arg).await,
            BotCommand::Shorten(None) => {
                CommandResult::error("Usage: /shorten <url>")
            }
            BotCommand::Status => self.handle_status(),
            BotCommand::Stats => self.handle_stats().await,
        }
    }

    fn handle_start() -> CommandResult {
        CommandResult::success(
            "👋 Hi! I shorten links.\n\n\
             Send me a URL, or use /shorten <url>.\n\
             /status shows which shortener services are configured.\n\
             /help lists all commands.",
        )
    }

    fn handle_help() -> CommandResult {
        let mut lines = vec!["Shortlink Bot commands:".to_owned(), String::new()];

        for (cmd, desc) in BotCommand::all_commands() {
            lines.push(format!("  {cmd} - {desc}"));
        }

        lines.push(String::new());
        lines.push("You can also just send a link as a plain message.".to_owned());

        CommandResult::success(lines.join("\n"))
    }

    fn handle_status(&self) -> CommandResult {
        CommandResult::success(self.config.status_lines())
    }

    async fn handle_stats(&self) -> CommandResult {
        let stats = self.stats.read().await;
        CommandResult::success(stats.summary())
    }

    /// Shortens a URL and renders the outcome as a reply.
    async fn shorten_reply(&self, url: &str) -> CommandResult {
        self.stats.write().await.record_request();

        match self.shortener.shorten(url).await {
            Ok(short) => {
                self.stats.write().await.record_success();
                info!("Replying with short URL: {}", short);
                CommandResult::success(short)
            }
            Err(e) => {
                self.stats.write().await.record_failure();
                CommandResult::error(format!("✗ Could not shorten that link: {e}"))
            }
        }
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Extracts the first URL-shaped token from a message text.
///
/// A token qualifies when it parses as an absolute http(s) URL.
#[must_use]
pub fn extract_url(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| validate_url(token).is_ok())
        .map(str::to_owned)
}
