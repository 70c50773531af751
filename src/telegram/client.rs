//! Telegram client wrapper for the shortlink bot.

use std::path::PathBuf;

use grammers_client::{Client, Config, InitParams, InvocationError, Update};
use grammers_session::Session;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TelegramConfig;

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Not authorized. Bot sign-in required.")]
    NotAuthorized,

    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        let err_str = err.to_string();

        // Check for flood wait errors
        if (err_str.contains("FLOOD_WAIT") || err_str.contains("flood"))
            && let Some(seconds) = extract_flood_wait_seconds(&err_str)
        {
            return Self::FloodWait(seconds);
        }

        Self::Invocation(err_str)
    }
}

/// Extracts flood wait seconds from an error message.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let patterns = ["FLOOD_WAIT_", "flood wait "];

    for pattern in patterns {
        if let Some(idx) = err_msg.to_lowercase().find(&pattern.to_lowercase()) {
            let start = idx + pattern.len();
            let num_str: String = err_msg[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(seconds) = num_str.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

/// High-level Telegram client wrapper.
///
/// Wraps a bot-account `grammers` client: connecting, token sign-in,
/// session persistence, and the update stream.
pub struct TelegramBot {
    /// The underlying grammers client.
    client: Client,

    /// Where the session file is persisted.
    session_path: PathBuf,
}

impl TelegramBot {
    /// Connects to Telegram with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or the connection
    /// fails.
    pub async fn connect(config: &TelegramConfig) -> Result<Self, TelegramError> {
        info!("Connecting to Telegram...");

        let session = Session::load_file_or_create(&config.session_path)
            .map_err(|e| TelegramError::Session(e.to_string()))?;

        let client = Client::connect(Config {
            session,
            api_id: config.api_id,
            api_hash: config.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| TelegramError::Connection(e.to_string()))?;

        let is_authorized = client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))?;

        info!("Connected to Telegram. Authorized: {}", is_authorized);

        Ok(Self {
            client,
            session_path: config.session_path.clone(),
        })
    }

    /// Checks if the client is authorized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Signs in as a bot with the given token, if not already authorized.
    ///
    /// # Errors
    ///
    /// Returns an error if sign-in fails or the session cannot be saved.
    pub async fn sign_in_bot(&self, bot_token: &str) -> Result<(), TelegramError> {
        if self.is_authorized().await? {
            debug!("Already authorized, skipping bot sign-in");
            return Ok(());
        }

        info!("Signing in as bot {}...", mask_token(bot_token));

        self.client
            .bot_sign_in(bot_token)
            .await
            .map_err(|e| TelegramError::SignInFailed(e.to_string()))?;

        info!("Successfully signed in!");
        self.save_session()?;

        Ok(())
    }

    /// Persists the current session to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn save_session(&self) -> Result<(), TelegramError> {
        self.client
            .session()
            .save_to_file(&self.session_path)
            .map_err(|e| TelegramError::Session(e.to_string()))
    }

    /// Waits for the next update from Telegram.
    ///
    /// # Errors
    ///
    /// Returns an error if the update stream fails.
    pub async fn next_update(&self) -> Result<Update, TelegramError> {
        self.client.next_update().await.map_err(Into::into)
    }

    /// Returns a reference to the underlying client for advanced operations.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("session_path", &self.session_path)
            .finish_non_exhaustive()
    }
}

/// Masks a bot token for logging (shows the numeric bot id only).
fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) if !bot_id.is_empty() => format!("{bot_id}:***"),
        _ => "***".to_owned(),
    }
}
