//! Internet Archive access
//!
//! [`ArchiveApi`] is the seam the conversation handlers depend on;
//! [`ArchiveClient`] is the HTTP implementation.

mod client;
mod metadata;
mod search;

pub use client::ArchiveClient;
pub use metadata::{MetadataFile, MetadataResponse};
pub use search::SearchResponse;

use crate::query::SearchQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Title used when a search document has none
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Author used when a search document has no creator
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A candidate book returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Display title
    pub title: String,
    /// First listed creator
    pub author: String,
    /// Opaque archive item identifier
    pub identifier: String,
}

impl BookRecord {
    /// Create a record from its parts
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            identifier: identifier.into(),
        }
    }
}

/// Direct URL of a PDF file inside an archive item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink(String);

impl DownloadLink {
    /// Wrap an already built URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DownloadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a HEAD request against a download link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// 200: the file can be downloaded
    Reachable,
    /// 403: the file exists but is restricted; offer the reader page instead
    Forbidden,
    /// Any other status; the candidate is skipped
    Other(u16),
}

impl LinkStatus {
    /// Classify an HTTP status code
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            200 => Self::Reachable,
            403 => Self::Forbidden,
            other => Self::Other(other),
        }
    }
}

/// Errors from archive HTTP calls. An empty result set is not an error.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),
    /// The request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// The archive answered with a non-success status
    #[error("Archive returned {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },
    /// The body was not the expected JSON
    #[error("JSON error: {0}")]
    Decode(String),
}

impl ArchiveError {
    /// Whether the failure is worth retrying
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for ArchiveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Operations the bots need from the archive
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveApi: Send + Sync {
    /// Run an advanced search, returning at most `rows` records.
    /// A response without documents yields an empty list.
    async fn search_books(
        &self,
        query: &SearchQuery,
        rows: u32,
    ) -> Result<Vec<BookRecord>, ArchiveError>;

    /// Look up item metadata and pick the first PDF/text file.
    async fn resolve_download_link(
        &self,
        identifier: &str,
    ) -> Result<Option<DownloadLink>, ArchiveError>;

    /// Check whether a download link is usable without fetching the body.
    async fn check_link(&self, link: &DownloadLink) -> Result<LinkStatus, ArchiveError>;

    /// Public reader page for an item
    fn read_online_url(&self, identifier: &str) -> String;
}
