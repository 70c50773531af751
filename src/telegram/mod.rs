//! Telegram client wrapper module.
//!
//! Provides high-level abstractions for interacting with Telegram,
//! including bot sign-in, the update stream, and per-user rate limiting.

mod client;
mod rate_limiter;

pub use client::{TelegramBot, TelegramError};
pub use grammers_client::Update;
pub use rate_limiter::RateLimiter;
