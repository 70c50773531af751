//! Shortener HTTP client.
//!
//! Issues one outbound request per shorten call against a configured
//! provider, with a bounded timeout and no retries. Provider failures are
//! converted into [`ShortenError`] values; the caller decides how to surface
//! them. When several providers are configured they are tried in order and
//! the first success wins.

use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::provider::{Provider, ProviderKind};

/// URL used by health probes. Kept stable so probe links are harmless.
pub const PROBE_URL: &str = "https://www.google.com";

/// Errors produced by the shortener client.
///
/// All variants are recovered locally and rendered as plain-text replies;
/// none of them crash the bot.
#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("invalid url")]
    InvalidUrl,

    #[error("network error")]
    Network(#[source] reqwest::Error),

    #[error("service error: {0}")]
    Upstream(u16),

    #[error("unexpected response from {0}")]
    BadResponse(&'static str),

    #[error("api key not configured for {0}")]
    MissingApiKey(&'static str),

    #[error("no shortener providers configured")]
    NoProviders,
}

/// Validates that the input is an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns [`ShortenError::InvalidUrl`] for anything else. No network call
/// is made.
pub fn validate_url(input: &str) -> Result<Url, ShortenError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ShortenError::InvalidUrl);
    }

    let url = Url::parse(input).map_err(|_| ShortenError::InvalidUrl)?;

    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(ShortenError::InvalidUrl);
    }

    Ok(url)
}

/// Bitly v4 shorten response.
#[derive(Debug, Deserialize)]
struct BitlyResponse {
    link: String,
}

/// Cuttly shorten response. `status == 7` means success.
#[derive(Debug, Deserialize)]
struct CuttlyResponse {
    url: CuttlyUrl,
}

#[derive(Debug, Deserialize)]
struct CuttlyUrl {
    status: i64,
    #[serde(rename = "shortLink", default)]
    short_link: Option<String>,
}

/// GPLinks JSON response. The service sometimes answers in plain text
/// instead, which is handled before JSON parsing is attempted.
#[derive(Debug, Deserialize)]
struct GpLinksResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(rename = "shortenedUrl", default)]
    shortened_url: Option<String>,
    #[serde(default)]
    shorturl: Option<String>,
}

/// Client for third-party URL-shortening services.
pub struct ShortenerClient {
    /// Shared HTTP client with the per-call timeout applied.
    http: reqwest::Client,

    /// Providers in fallback order.
    providers: Vec<Provider>,
}

impl ShortenerClient {
    /// Creates a client over the given providers.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(providers: Vec<Provider>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()?;

        Ok(Self { http, providers })
    }

    /// Returns the configured providers in fallback order.
    #[must_use]
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Shortens a URL, trying the configured providers in order.
    ///
    /// The input is validated before any network call. The first provider
    /// to succeed wins; if every provider fails, the last failure is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the validation failure, or the last provider failure.
    pub async fn shorten(&self, long_url: &str) -> Result<String, ShortenError> {
        let url = validate_url(long_url)?;

        let mut last_err = None;

        for provider in &self.providers {
            match self.shorten_with(provider, url.as_str()).await {
                Ok(short) => {
                    info!("Shortened via {}: {}", provider.kind, short);
                    return Ok(short);
                }
                Err(e @ ShortenError::MissingApiKey(_)) => {
                    debug!("Skipping {}: {}", provider.kind, e);
                    last_err = Some(e);
                }
                Err(e) => {
                    warn!("Provider {} failed: {}", provider.kind, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or(ShortenError::NoProviders))
    }

    /// Shortens a URL with a single provider.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid input, missing key, network failure,
    /// non-2xx status, or an unparseable response.
    pub async fn shorten_with(
        &self,
        provider: &Provider,
        long_url: &str,
    ) -> Result<String, ShortenError> {
        let url = validate_url(long_url)?;
        let kind = provider.kind;

        if kind.requires_key() && provider.api_key.is_none() {
            return Err(ShortenError::MissingApiKey(kind.name()));
        }

        debug!("Shortening with {}: {}", kind, url);

        let response = self
            .send_request(provider, url.as_str())
            .await
            .map_err(ShortenError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShortenError::Upstream(status.as_u16()));
        }

        let body = response.text().await.map_err(ShortenError::Network)?;
        let short = parse_response(kind, &body)?;

        // The upstream answer must itself be a well-formed URL.
        validate_url(&short).map_err(|_| ShortenError::BadResponse(kind.name()))?;

        Ok(short)
    }

    /// Probes a provider with a harmless shorten request.
    ///
    /// Returns the round-trip time on success.
    ///
    /// # Errors
    ///
    /// Returns the same failures as [`Self::shorten_with`].
    pub async fn probe(&self, provider: &Provider) -> Result<Duration, ShortenError> {
        let started = Instant::now();
        self.shorten_with(provider, PROBE_URL).await?;
        Ok(started.elapsed())
    }

    /// Builds and sends the provider-specific HTTP request.
    async fn send_request(
        &self,
        provider: &Provider,
        long_url: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let key = provider.api_key.as_deref().unwrap_or_default();

        match provider.kind {
            ProviderKind::TinyUrl => {
                self.http
                    .get(&provider.endpoint)
                    .query(&[("url", long_url)])
                    .send()
                    .await
            }
            ProviderKind::Bitly => {
                self.http
                    .post(&provider.endpoint)
                    .bearer_auth(key)
                    .json(&serde_json::json!({ "long_url": long_url }))
                    .send()
                    .await
            }
            ProviderKind::Cuttly => {
                self.http
                    .get(&provider.endpoint)
                    .query(&[("key", key), ("short", long_url)])
                    .send()
                    .await
            }
            ProviderKind::GpLinks => {
                self.http
                    .get(&provider.endpoint)
                    .query(&[("api", key), ("url", long_url)])
                    .header("Accept", "application/json")
                    .send()
                    .await
            }
        }
    }
}

impl std::fmt::Debug for ShortenerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortenerClient")
            .field("providers", &self.providers)
            .finish_non_exhaustive()
    }
}

/// Extracts the short URL from a provider response body.
fn parse_response(kind: ProviderKind, body: &str) -> Result<String, ShortenError> {
    let name = kind.name();

    match kind {
        ProviderKind::TinyUrl => {
            let short = body.trim();
            if short.is_empty() {
                Err(ShortenError::BadResponse(name))
            } else {
                Ok(short.to_owned())
            }
        }
        ProviderKind::Bitly => serde_json::from_str::<BitlyResponse>(body)
            .map(|r| r.link)
            .map_err(|_| ShortenError::BadResponse(name)),
        ProviderKind::Cuttly => {
            let parsed: CuttlyResponse =
                serde_json::from_str(body).map_err(|_| ShortenError::BadResponse(name))?;
            if parsed.url.status == 7
                && let Some(link) = parsed.url.short_link
            {
                Ok(link)
            } else {
                Err(ShortenError::BadResponse(name))
            }
        }
        ProviderKind::GpLinks => {
            let trimmed = body.trim();
            if trimmed.starts_with("http") {
                return Ok(trimmed.to_owned());
            }

            let parsed: GpLinksResponse =
                serde_json::from_str(trimmed).map_err(|_| ShortenError::BadResponse(name))?;

            if parsed.status.as_deref() == Some("success") || parsed.shortened_url.is_some() {
                parsed
                    .shortened_url
                    .or(parsed.shorturl)
                    .ok_or(ShortenError::BadResponse(name))
            } else {
                Err(ShortenError::BadResponse(name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(providers: Vec<Provider>) -> ShortenerClient {
        ShortenerClient::new(providers, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_inputs_fail_without_network() {
        // An unroutable endpoint: any network attempt would error differently.
        let provider =
            Provider::new(ProviderKind::TinyUrl, None).with_endpoint("http://127.0.0.1:1/api");
        let client = client_with(vec![provider]);

        for input in ["", "   ", "no-scheme.example.com", "ftp://example.com/x"] {
            let err = client.shorten(input).await.unwrap_err();
            assert!(matches!(err, ShortenError::InvalidUrl), "input: {input:?}");
            assert_eq!(err.to_string(), "invalid url");
        }
    }

    #[tokio::test]
    async fn test_tinyurl_success_returns_exact_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api-create.php")
            .match_query(mockito::Matcher::UrlEncoded(
                "url".into(),
                "https://example.com/very/long/path".into(),
            ))
            .with_status(200)
            .with_body("https://tinyurl.com/abc123")
            .create_async()
            .await;

        let provider = Provider::new(ProviderKind::TinyUrl, None)
            .with_endpoint(format!("{}/api-create.php", server.url()));
        let client = client_with(vec![provider]);

        let short = client
            .shorten("https://example.com/very/long/path")
            .await
            .unwrap();
        assert_eq!(short, "https://tinyurl.com/abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api-create.php")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let provider = Provider::new(ProviderKind::TinyUrl, None)
            .with_endpoint(format!("{}/api-create.php", server.url()));
        let client = client_with(vec![provider]);

        let err = client.shorten("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, ShortenError::Upstream(500)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_timeout_reports_network_error() {
        // A listener that never responds: the connection succeeds but the
        // request times out at the client's deadline.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api-create.php", listener.local_addr().unwrap());

        let provider = Provider::new(ProviderKind::TinyUrl, None).with_endpoint(endpoint);
        let client =
            ShortenerClient::new(vec![provider], Duration::from_millis(250)).unwrap();

        let started = Instant::now();
        let err = client.shorten("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, ShortenError::Network(_)));
        assert_eq!(err.to_string(), "network error");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_bitly_parses_link_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v4/shorten")
            .match_header("authorization", "Bearer token-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"link": "https://bit.ly/xyz", "id": "bit.ly/xyz"}"#)
            .create_async()
            .await;

        let provider = Provider::new(ProviderKind::Bitly, Some("token-123".to_owned()))
            .with_endpoint(format!("{}/v4/shorten", server.url()));
        let client = client_with(vec![provider]);

        let short = client.shorten("https://example.com/x").await.unwrap();
        assert_eq!(short, "https://bit.ly/xyz");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cuttly_rejects_non_success_status_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/api.php")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"url": {"status": 3}}"#)
            .create_async()
            .await;

        let provider = Provider::new(ProviderKind::Cuttly, Some("key".to_owned()))
            .with_endpoint(format!("{}/api/api.php", server.url()));
        let client = client_with(vec![provider]);

        let err = client.shorten("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, ShortenError::BadResponse("cuttly")));
    }

    #[tokio::test]
    async fn test_gplinks_accepts_plain_text_and_json() {
        assert_eq!(
            parse_response(ProviderKind::GpLinks, "https://gplinks.in/abc\n").unwrap(),
            "https://gplinks.in/abc"
        );
        assert_eq!(
            parse_response(
                ProviderKind::GpLinks,
                r#"{"status": "success", "shortenedUrl": "https://gplinks.in/def"}"#
            )
            .unwrap(),
            "https://gplinks.in/def"
        );
        assert!(parse_response(ProviderKind::GpLinks, r#"{"status": "error"}"#).is_err());
    }

    #[tokio::test]
    async fn test_missing_key_fails_single_provider() {
        let provider = Provider::new(ProviderKind::Bitly, None);
        let client = client_with(vec![provider.clone()]);

        let err = client
            .shorten_with(&provider, "https://example.com/x")
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenError::MissingApiKey("bitly")));
    }

    #[tokio::test]
    async fn test_fallback_skips_failing_provider() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cuttly")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("GET", "/tiny")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("https://tinyurl.com/fallback")
            .create_async()
            .await;

        let providers = vec![
            Provider::new(ProviderKind::Bitly, None), // skipped: no key
            Provider::new(ProviderKind::Cuttly, Some("key".to_owned()))
                .with_endpoint(format!("{}/cuttly", server.url())),
            Provider::new(ProviderKind::TinyUrl, None)
                .with_endpoint(format!("{}/tiny", server.url())),
        ];
        let client = client_with(providers);

        let short = client.shorten("https://example.com/x").await.unwrap();
        assert_eq!(short, "https://tinyurl.com/fallback");
    }

    #[tokio::test]
    async fn test_no_providers() {
        let client = client_with(vec![]);
        let err = client.shorten("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, ShortenError::NoProviders));
    }

    #[tokio::test]
    async fn test_short_url_must_be_well_formed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api-create.php")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("Error: over quota")
            .create_async()
            .await;

        let provider = Provider::new(ProviderKind::TinyUrl, None)
            .with_endpoint(format!("{}/api-create.php", server.url()));
        let client = client_with(vec![provider]);

        let err = client.shorten("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, ShortenError::BadResponse("tinyurl")));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/path?q=1").is_ok());
        assert!(validate_url("http://localhost:8080").is_ok());
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("https://").is_err());
        assert!(validate_url("mailto:user@example.com").is_err());
    }
}
