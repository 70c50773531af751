//! Shortener provider configuration.
//!
//! Selects which backends the bot uses and in which fallback order, and
//! resolves their API keys from the environment. A generic `SHORTENER_API`
//! key applies to every selected provider that needs one; per-provider
//! variables (`BITLY_TOKEN`, `CUTTLY_API`, `GPLINKS_API`) take precedence.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::shortener::{Provider, ProviderKind};

/// Configuration of the shortener backends, in fallback order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    /// Providers to try, first to last.
    pub providers: Vec<Provider>,
}

impl ShortenerConfig {
    /// Creates configuration from environment variables.
    ///
    /// `SHORTENER_PROVIDERS` is a comma-separated provider list defining the
    /// fallback order; unset means all supported providers with the keyless
    /// one first.
    ///
    /// # Errors
    ///
    /// Returns an error if `SHORTENER_PROVIDERS` names an unknown provider.
    pub fn from_env() -> Result<Self, ConfigError> {
        let order = match std::env::var("SHORTENER_PROVIDERS") {
            Ok(raw) => parse_provider_order(&raw)?,
            Err(_) => ProviderKind::DEFAULT_ORDER.to_vec(),
        };

        let generic_key = env_non_empty("SHORTENER_API");

        let providers = order
            .into_iter()
            .map(|kind| {
                let key = kind
                    .key_env_var()
                    .and_then(env_non_empty)
                    .or_else(|| kind.requires_key().then(|| generic_key.clone()).flatten());
                Provider::new(kind, key)
            })
            .collect();

        Ok(Self { providers })
    }

    /// Returns the number of providers that can actually be called.
    #[must_use]
    pub fn usable_count(&self) -> usize {
        self.providers.iter().filter(|p| p.is_usable()).count()
    }

    /// Returns the number of configured providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Checks if no providers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Builds the per-provider status text for the `/status` reply.
    #[must_use]
    pub fn status_lines(&self) -> String {
        let mut lines = vec!["Provider status:".to_owned()];

        for provider in &self.providers {
            let kind = provider.kind;
            let key_info = if kind.requires_key() {
                provider
                    .api_key
                    .as_deref()
                    .map_or_else(|| "not set".to_owned(), mask_key)
            } else {
                "not required".to_owned()
            };

            let marker = if provider.is_usable() { "✓" } else { "✗" };
            lines.push(format!("{marker} {} ({key_info})", kind.display_name()));
        }

        lines.join("\n")
    }
}

/// Parses a comma-separated provider list, preserving order.
fn parse_provider_order(raw: &str) -> Result<Vec<ProviderKind>, ConfigError> {
    let mut order = Vec::new();

    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let kind: ProviderKind = part
            .parse()
            .map_err(ConfigError::UnknownProvider)?;
        if !order.contains(&kind) {
            order.push(kind);
        }
    }

    Ok(order)
}

/// Reads an environment variable, treating empty values as unset.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Masks an API key for display (shows the first 4 characters).
fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() > 4 {
        format!("{visible}...")
    } else {
        "****".to_owned()
    }
}
