//! Telegram transport settings.

use book_finder_core::config::{build_config, ArchiveSettings};
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Bot API host used for the audit side-channel
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Time-to-live (seconds) for an idle menu session.
/// Default: 1 hour.
pub const SESSION_TTL_SECS: u64 = 3600;
/// Maximum number of menu sessions kept in memory.
pub const SESSION_MAX_CAPACITY: u64 = 10_000;

/// Retries for a failed Telegram API call
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff before retrying a Telegram API call
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound for a single Telegram API backoff delay
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 5000;

/// Which conversation flow this process runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BotVariant {
    /// Inline-button menu with per-chat selection state
    #[default]
    Menu,
    /// Stateless progressive relaxation with audit side-channel and sticker
    Relaxed,
}

/// A required setting is missing or blank
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// Setting (named by its environment variable) is not set
    #[error("Missing required setting {0}")]
    Missing(&'static str),
}

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramSettings {
    /// Telegram Bot API token.
    #[serde(default)]
    pub telegram_token: String,
    /// Conversation flow to run.
    #[serde(default)]
    pub bot_variant: BotVariant,
    /// Token of the bot that relays incoming queries (relaxed flow).
    pub audit_bot_token: Option<String>,
    /// Chat that receives relayed queries (relaxed flow).
    pub audit_chat_id: Option<i64>,
    /// Sticker sent at the end of every relaxed search.
    pub sticker_file_id: Option<String>,
    /// Bot API base URL for the audit side-channel.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    /// Idle session lifetime in seconds (menu flow).
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Maximum number of sessions kept (menu flow).
    #[serde(default = "default_session_max_capacity")]
    pub session_max_capacity: u64,
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

const fn default_session_ttl_secs() -> u64 {
    SESSION_TTL_SECS
}

const fn default_session_max_capacity() -> u64 {
    SESSION_MAX_CAPACITY
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            bot_variant: BotVariant::default(),
            audit_bot_token: None,
            audit_chat_id: None,
            sticker_file_id: None,
            telegram_api_url: default_telegram_api_url(),
            session_ttl_secs: SESSION_TTL_SECS,
            session_max_capacity: SESSION_MAX_CAPACITY,
        }
    }
}

/// Values the relaxed flow cannot run without
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaxedSecrets {
    /// Audit bot token
    pub audit_bot_token: String,
    /// Audit recipient chat
    pub audit_chat_id: i64,
    /// Closing sticker
    pub sticker_file_id: String,
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Check that everything the selected variant needs is present.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Missing` naming the first absent value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.telegram_token.trim().is_empty() {
            return Err(SettingsError::Missing("TELEGRAM_TOKEN"));
        }
        if self.bot_variant == BotVariant::Relaxed {
            self.relaxed_secrets()?;
        }
        Ok(())
    }

    /// Secrets for the relaxed flow.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Missing` if any of them is absent or blank.
    pub fn relaxed_secrets(&self) -> Result<RelaxedSecrets, SettingsError> {
        let audit_bot_token = non_blank(self.audit_bot_token.as_deref())
            .ok_or(SettingsError::Missing("AUDIT_BOT_TOKEN"))?;
        let audit_chat_id = self
            .audit_chat_id
            .ok_or(SettingsError::Missing("AUDIT_CHAT_ID"))?;
        let sticker_file_id = non_blank(self.sticker_file_id.as_deref())
            .ok_or(SettingsError::Missing("STICKER_FILE_ID"))?;

        Ok(RelaxedSecrets {
            audit_bot_token,
            audit_chat_id,
            sticker_file_id,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Archive client settings.
    pub archive: Arc<ArchiveSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(archive: ArchiveSettings, telegram: TelegramSettings) -> Self {
        Self {
            archive: Arc::new(archive),
            telegram: Arc::new(telegram),
        }
    }
}
