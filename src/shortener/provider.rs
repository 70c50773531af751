//! Shortener provider backends.
//!
//! Each supported third-party shortening service is a [`ProviderKind`]
//! variant. The wire contract (method, authentication, response shape)
//! differs per service and lives in the client, keyed on the kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported URL-shortening backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// TinyURL, anonymous plain-text API.
    TinyUrl,

    /// Bitly v4 JSON API, requires a bearer token.
    Bitly,

    /// Cuttly JSON API, requires an API key.
    Cuttly,

    /// GPLinks monetized shortener, requires an API key.
    GpLinks,
}

impl ProviderKind {
    /// All supported providers in the default fallback order.
    ///
    /// The keyless provider comes first so an unconfigured bot still works.
    pub const DEFAULT_ORDER: [Self; 4] = [Self::TinyUrl, Self::Bitly, Self::Cuttly, Self::GpLinks];

    /// Returns the provider name as used in configuration and replies.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TinyUrl => "tinyurl",
            Self::Bitly => "bitly",
            Self::Cuttly => "cuttly",
            Self::GpLinks => "gplinks",
        }
    }

    /// Returns the human-readable service name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TinyUrl => "TinyURL",
            Self::Bitly => "Bitly",
            Self::Cuttly => "Cuttly",
            Self::GpLinks => "GPLinks",
        }
    }

    /// Returns the production API endpoint for this provider.
    #[must_use]
    pub const fn default_endpoint(self) -> &'static str {
        match self {
            Self::TinyUrl => "https://tinyurl.com/api-create.php",
            Self::Bitly => "https://api-ssl.bitly.com/v4/shorten",
            Self::Cuttly => "https://cutt.ly/api/api.php",
            Self::GpLinks => "https://gplinks.in/api",
        }
    }

    /// Whether the provider refuses anonymous requests.
    #[must_use]
    pub const fn requires_key(self) -> bool {
        !matches!(self, Self::TinyUrl)
    }

    /// Name of the provider-specific environment variable holding its key.
    #[must_use]
    pub const fn key_env_var(self) -> Option<&'static str> {
        match self {
            Self::TinyUrl => None,
            Self::Bitly => Some("BITLY_TOKEN"),
            Self::Cuttly => Some("CUTTLY_API"),
            Self::GpLinks => Some("GPLINKS_API"),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tinyurl" | "tiny" => Ok(Self::TinyUrl),
            "bitly" => Ok(Self::Bitly),
            "cuttly" | "cutt" => Ok(Self::Cuttly),
            "gplinks" | "gpl" => Ok(Self::GpLinks),
            other => Err(other.to_owned()),
        }
    }
}

/// A configured provider instance: the backend plus its endpoint and key.
///
/// The endpoint is stored per instance so tests can point a provider at a
/// stub HTTP server instead of the real service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// Which backend this is.
    pub kind: ProviderKind,

    /// Endpoint the shorten request is sent to.
    pub endpoint: String,

    /// API key, if one is configured.
    pub api_key: Option<String>,
}

impl Provider {
    /// Creates a provider pointing at the production endpoint.
    #[must_use]
    pub fn new(kind: ProviderKind, api_key: Option<String>) -> Self {
        Self {
            kind,
            endpoint: kind.default_endpoint().to_owned(),
            api_key,
        }
    }

    /// Replaces the endpoint (used by tests and health probes).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Whether this provider can actually be called.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.kind.requires_key() || self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_names() {
        assert_eq!("tinyurl".parse::<ProviderKind>(), Ok(ProviderKind::TinyUrl));
        assert_eq!("Bitly".parse::<ProviderKind>(), Ok(ProviderKind::Bitly));
        assert_eq!(" cuttly ".parse::<ProviderKind>(), Ok(ProviderKind::Cuttly));
        assert_eq!("gpl".parse::<ProviderKind>(), Ok(ProviderKind::GpLinks));
        assert!("shady".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_requires_key() {
        assert!(!ProviderKind::TinyUrl.requires_key());
        assert!(ProviderKind::Bitly.requires_key());
        assert!(ProviderKind::Cuttly.requires_key());
        assert!(ProviderKind::GpLinks.requires_key());
    }

    #[test]
    fn test_usable_without_key() {
        let tiny = Provider::new(ProviderKind::TinyUrl, None);
        assert!(tiny.is_usable());

        let bitly = Provider::new(ProviderKind::Bitly, None);
        assert!(!bitly.is_usable());

        let bitly = Provider::new(ProviderKind::Bitly, Some("token".to_owned()));
        assert!(bitly.is_usable());
    }

    #[test]
    fn test_with_endpoint() {
        let p = Provider::new(ProviderKind::TinyUrl, None).with_endpoint("http://127.0.0.1:9");
        assert_eq!(p.endpoint, "http://127.0.0.1:9");
    }
}
