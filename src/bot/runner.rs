//! Bot update loop.
//!
//! Each update is handled independently:
//! 1. Pull the next update from Telegram
//! 2. For messages: rate-limit shorten traffic, hand the text to the
//!    command handler, send the reply
//! 3. For inline queries: same flow, answered as a single article
//!
//! Failures are logged and answered; they never stop the loop. A flood
//! wait from Telegram pauses the loop for the required seconds.

use std::sync::Arc;
use std::time::Duration;

use grammers_client::InputMessage;
use grammers_client::types::inline::query::Article;
use grammers_client::types::{InlineQuery, Message};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::commands::{BotCommand, CommandHandler, extract_url};
use crate::telegram::{RateLimiter, TelegramBot, TelegramError, Update};

/// Messages that can be sent to the runner.
#[derive(Debug, Clone)]
pub enum RunnerMessage {
    /// Stop the update loop.
    Shutdown,
}

/// Drives the Telegram update loop.
pub struct BotRunner {
    /// Telegram client wrapper.
    bot: Arc<TelegramBot>,

    /// Message and command handling.
    handler: CommandHandler,

    /// Per-user shorten budget.
    limiter: RateLimiter,
}

impl BotRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new(bot: Arc<TelegramBot>, handler: CommandHandler, limiter: RateLimiter) -> Self {
        Self {
            bot,
            handler,
            limiter,
        }
    }

    /// Runs the update loop until shutdown.
    pub async fn run(&self, mut rx: mpsc::Receiver<RunnerMessage>) {
        info!("Update loop started");

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(RunnerMessage::Shutdown) | None => {
                            info!("Update loop shutting down");
                            break;
                        }
                    }
                }
                update = self.bot.next_update() => {
                    match update {
                        Ok(update) => self.dispatch(update).await,
                        Err(TelegramError::FloodWait(seconds)) => {
                            warn!("Flood wait from Telegram: {} seconds", seconds);
                            tokio::time::sleep(Duration::from_secs(u64::from(seconds))).await;
                        }
                        Err(e) => {
                            error!("Failed to fetch update: {}", e);
                            // Back off briefly so a broken stream cannot spin.
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }
    }

    /// Routes a single update to its handler.
    async fn dispatch(&self, update: Update) {
        match update {
            Update::NewMessage(message) if !message.outgoing() => {
                self.on_message(message).await;
            }
            Update::InlineQuery(query) => {
                self.on_inline_query(query).await;
            }
            _ => {}
        }
    }

    /// Handles an incoming direct message.
    async fn on_message(&self, message: Message) {
        let text = message.text().to_owned();
        if text.trim().is_empty() {
            return;
        }

        debug!("Incoming message: {}", truncate(&text, 60));

        if wants_shorten(&text)
            && let Some(sender) = message.sender()
            && let Err(retry_after) = self.limiter.try_acquire(sender.id()).await
        {
            let reply = format!(
                "⏳ Too many requests. Try again in {} seconds.",
                retry_after.as_secs().max(1)
            );
            self.send_reply(&message, &reply).await;
            return;
        }

        let result = self.handler.handle_text(&text).await;
        self.send_reply(&message, &result.message).await;
    }

    /// Handles an inline query by answering with a single article.
    async fn on_inline_query(&self, query: InlineQuery) {
        let text = query.text().to_owned();
        debug!("Inline query: {}", truncate(&text, 60));

        if let Err(retry_after) = self.limiter.try_acquire(query.sender().id()).await {
            debug!(
                "Dropping inline query, rate limited for {:?}",
                retry_after
            );
            return;
        }

        let result = self.handler.handle_inline(&text).await;
        let title = if result.success {
            "Shortened link"
        } else {
            "Could not shorten"
        };

        let article = Article::new(title, InputMessage::text(&result.message))
            .description(truncate(&result.message, 100));

        if let Err(e) = query.answer(vec![article.into()]).send().await {
            warn!("Failed to answer inline query: {}", TelegramError::from(e));
        }
    }

    /// Sends a reply, logging and absorbing failures.
    async fn send_reply(&self, message: &Message, text: &str) {
        if let Err(e) = message.respond(text).await {
            let err = TelegramError::from(e);
            if let TelegramError::FloodWait(seconds) = err {
                warn!("Flood wait while replying: {} seconds", seconds);
                tokio::time::sleep(Duration::from_secs(u64::from(seconds))).await;
            } else {
                warn!("Failed to send reply: {}", err);
            }
        }
    }
}

impl std::fmt::Debug for BotRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRunner")
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

/// Whether a message text will trigger an outbound shortener call.
fn wants_shorten(text: &str) -> bool {
    match BotCommand::parse(text) {
        Some(BotCommand::Shorten(Some(_))) => true,
        Some(_) => false,
        None => extract_url(text).is_some(),
    }
}

/// Truncates a string for display.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_shorten() {
        assert!(wants_shorten("https://example.com/x"));
        assert!(wants_shorten("Shorten https://example.com/x"));
        assert!(wants_shorten("/shorten https://example.com/x"));
        assert!(!wants_shorten("/help"));
        assert!(!wants_shorten("/shorten"));
        assert!(!wants_shorten("hello"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello, World!", 5), "Hello...");
    }
}
