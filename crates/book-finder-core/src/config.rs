//! Configuration and settings management
//!
//! Loads archive client settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public Internet Archive host used for search, metadata and "read online" links
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://archive.org";
/// Timeout for a single archive HTTP call
pub const ARCHIVE_HTTP_TIMEOUT_SECS: u64 = 30;
/// Retries after the first attempt on transient failures
pub const ARCHIVE_MAX_RETRIES: usize = 1;
/// Multiplier applied to the exponential backoff base (2^n * factor ms)
pub const ARCHIVE_BACKOFF_FACTOR_MS: u64 = 250;
/// Upper bound for a single backoff delay
pub const ARCHIVE_MAX_BACKOFF_MS: u64 = 4000;
/// Rows requested by the menu bot (one button per row)
pub const MENU_SEARCH_ROWS: u32 = 100;
/// Rows requested by the relaxed bot (every row is resolved and its link checked)
pub const RELAXED_SEARCH_ROWS: u32 = 10;

/// Build the layered configuration shared by all settings structs.
///
/// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__`-prefixed environment, plain environment.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Environment::default() maps UPPER_SNAKE_CASE to snake_case keys
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Settings for talking to the Internet Archive
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ArchiveSettings {
    /// Base URL for `advancedsearch.php`, `metadata/` and `details/`
    #[serde(default = "default_archive_base_url")]
    pub archive_base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_archive_http_timeout_secs")]
    pub archive_http_timeout_secs: u64,
    /// Retries on transient failures (0 disables retrying)
    #[serde(default = "default_archive_max_retries")]
    pub archive_max_retries: usize,
    /// Rows requested per search by the menu bot
    #[serde(default = "default_menu_search_rows")]
    pub menu_search_rows: u32,
    /// Rows requested per search by the relaxed bot
    #[serde(default = "default_relaxed_search_rows")]
    pub relaxed_search_rows: u32,
}

fn default_archive_base_url() -> String {
    DEFAULT_ARCHIVE_BASE_URL.to_string()
}

const fn default_archive_http_timeout_secs() -> u64 {
    ARCHIVE_HTTP_TIMEOUT_SECS
}

const fn default_archive_max_retries() -> usize {
    ARCHIVE_MAX_RETRIES
}

const fn default_menu_search_rows() -> u32 {
    MENU_SEARCH_ROWS
}

const fn default_relaxed_search_rows() -> u32 {
    RELAXED_SEARCH_ROWS
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            archive_base_url: default_archive_base_url(),
            archive_http_timeout_secs: ARCHIVE_HTTP_TIMEOUT_SECS,
            archive_max_retries: ARCHIVE_MAX_RETRIES,
            menu_search_rows: MENU_SEARCH_ROWS,
            relaxed_search_rows: RELAXED_SEARCH_ROWS,
        }
    }
}

impl ArchiveSettings {
    /// Load archive settings from config files and environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use book_finder_core::config::ArchiveSettings;
    ///
    /// let settings = ArchiveSettings::new().expect("Failed to load configuration");
    /// assert!(settings.archive_http_timeout_secs > 0);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading or deserialization fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Settings pointing at a different archive host, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            archive_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.archive_http_timeout_secs)
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.archive_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let settings = ArchiveSettings::default();
        assert_eq!(settings.archive_base_url, DEFAULT_ARCHIVE_BASE_URL);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.archive_max_retries, 1);
        assert_eq!(settings.menu_search_rows, 100);
        assert_eq!(settings.relaxed_search_rows, 10);
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let settings = ArchiveSettings::with_base_url("http://127.0.0.1:8080/");
        assert_eq!(settings.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_deserialize_fills_missing_fields() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::builder()
            .set_override("archive_http_timeout_secs", 5)?
            .build()?;
        let settings: ArchiveSettings = config.try_deserialize()?;

        assert_eq!(settings.archive_http_timeout_secs, 5);
        assert_eq!(settings.archive_base_url, DEFAULT_ARCHIVE_BASE_URL);
        assert_eq!(settings.relaxed_search_rows, RELAXED_SEARCH_ROWS);
        Ok(())
    }
}
