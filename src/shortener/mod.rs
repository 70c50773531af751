//! URL shortener client module.
//!
//! Provides the outbound side of the bot: provider definitions and the
//! HTTP client that turns a long URL into a short one.

mod client;
mod provider;

pub use client::{PROBE_URL, ShortenError, ShortenerClient, validate_url};
pub use provider::{Provider, ProviderKind};
