//! Standalone health checker for shortener providers.
//!
//! Probes each configured provider with a harmless shorten request and
//! reports whether the service answers, and how fast. Useful before
//! deploying, or when the bot starts replying with service errors.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

// Import from the main crate
use shortlink_bot::config::ShortenerConfig;
use shortlink_bot::shortener::{ShortenError, ShortenerClient};

/// Shortener provider health checker.
#[derive(Parser, Debug)]
#[command(name = "check_providers")]
#[command(about = "Probes the configured URL-shortener services")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Timeout per probe in seconds.
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    /// Also probe providers whose API key is missing.
    #[arg(short, long)]
    all: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _ = dotenvy::from_filename(&args.env_file);

    let config = match ShortenerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load shortener configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.is_empty() {
        eprintln!("✗ No shortener providers configured");
        return ExitCode::FAILURE;
    }

    let client = match ShortenerClient::new(
        config.providers.clone(),
        Duration::from_secs(args.timeout),
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Probing {} provider(s)...\n", config.len());

    let mut failures = 0;
    let mut skipped = 0;

    for provider in client.providers() {
        let name = provider.kind.display_name();

        if !provider.is_usable() && !args.all {
            println!("- {name}: skipped (no API key)");
            skipped += 1;
            continue;
        }

        match client.probe(provider).await {
            Ok(elapsed) => {
                println!("✓ {name}: ok ({} ms)", elapsed.as_millis());
            }
            Err(e @ ShortenError::MissingApiKey(_)) => {
                println!("- {name}: skipped ({e})");
                skipped += 1;
            }
            Err(e) => {
                failures += 1;
                println!("✗ {name}: {e}");
            }
        }
    }

    let probed = config.len() - skipped;
    println!();

    if failures == 0 {
        println!("✓ All {probed} probed provider(s) are reachable");
        if skipped > 0 {
            println!("  ({skipped} provider(s) skipped for missing API keys)");
        }
        ExitCode::SUCCESS
    } else {
        println!("✗ {failures} of {probed} probed provider(s) failed");
        ExitCode::FAILURE
    }
}
