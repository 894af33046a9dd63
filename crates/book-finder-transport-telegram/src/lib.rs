#![deny(missing_docs)]
//! Telegram transport for the book finder bots.

/// Conversation flows, session state and reply rendering.
pub mod bot;
/// Telegram transport configuration.
pub mod config;
/// Telegram runtime entrypoint.
pub mod runner;
/// Retry helpers for Telegram API calls.
pub mod utils;
