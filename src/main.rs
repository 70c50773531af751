//! Shortlink Bot - Main Entry Point
//!
//! A Telegram bot that forwards user-supplied URLs to third-party
//! URL-shortening services and replies with the result.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use shortlink_bot::bot::{BotRunner, BotStats, RunnerMessage};
use shortlink_bot::commands::CommandHandler;
use shortlink_bot::config::{BotSettings, ShortenerConfig, TelegramConfig};
use shortlink_bot::shortener::ShortenerClient;
use shortlink_bot::telegram::{RateLimiter, TelegramBot};

/// Telegram bot for shortening URLs.
#[derive(Parser, Debug)]
#[command(name = "shortlink_bot")]
#[command(about = "Shorten URLs sent to your Telegram bot")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let settings = BotSettings::from_env_with_defaults();

    let shortener_config =
        ShortenerConfig::from_env().context("Failed to load shortener configuration")?;

    info!(
        "Loaded {} shortener providers ({} usable)",
        shortener_config.len(),
        shortener_config.usable_count()
    );

    if shortener_config.usable_count() == 0 {
        warn!("No usable shortener providers; every shorten request will fail");
    }

    // Build the shortener client
    let shortener = ShortenerClient::new(
        shortener_config.providers.clone(),
        Duration::from_secs(settings.http_timeout_secs),
    )
    .context("Failed to build the shortener HTTP client")?;

    // Connect to Telegram and sign in with the bot token
    let bot = TelegramBot::connect(&tg_config)
        .await
        .context("Failed to connect to Telegram")?;

    bot.sign_in_bot(&tg_config.bot_token)
        .await
        .context("Bot sign-in failed")?;

    let bot = Arc::new(bot);
    let stats = Arc::new(RwLock::new(BotStats::new()));

    let handler = CommandHandler::new(Arc::new(shortener), shortener_config, Arc::clone(&stats));

    let limiter = RateLimiter::new(
        settings.rate_limit_per_user,
        Duration::from_secs(settings.rate_limit_window_secs),
    );

    let runner = BotRunner::new(Arc::clone(&bot), handler, limiter);

    // Create runner channel
    let (runner_tx, runner_rx) = mpsc::channel::<RunnerMessage>(32);

    info!("Starting shortlink bot...");

    // Spawn the update loop
    let runner_handle = tokio::spawn(async move {
        runner.run(runner_rx).await;
    });

    info!("Bot is running. Use Ctrl+C to stop.");

    // Wait for Ctrl+C
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    // Cleanup
    info!("Shutting down...");
    let _ = runner_tx.send(RunnerMessage::Shutdown).await;
    let _ = runner_handle.await;

    if let Err(e) = bot.save_session() {
        warn!("Failed to save session on shutdown: {}", e);
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
