//! Shortlink Bot Library
//!
//! A Telegram bot that shortens URLs via third-party shortener services.
//!
//! This crate provides the core functionality for:
//! - Loading and validating bot and provider configuration
//! - Connecting to Telegram via `MTProto` with a bot token
//! - Calling URL-shortening HTTP APIs with fallback across providers
//! - Handling user commands and inline queries

pub mod bot;
pub mod commands;
pub mod config;
pub mod shortener;
pub mod telegram;
