//! Configuration module for the shortlink bot.
//!
//! Handles loading and validation of bot configuration including Telegram
//! API credentials, shortener provider selection, and runtime settings.

mod providers;
mod settings;

pub use providers::ShortenerConfig;
pub use settings::{BotSettings, ConfigError, TelegramConfig};

/// Default timeout for a single shortener HTTP call, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default maximum shorten requests per user per rate-limit window.
pub const DEFAULT_RATE_LIMIT_PER_USER: u32 = 5;

/// Default per-user rate-limit window, in seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
