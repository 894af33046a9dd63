//! Side-channel notification of incoming queries.
//!
//! The relaxed bot relays every query, with the sender's identity, to a fixed
//! chat through a second bot. Delivery failures are the caller's to log; they
//! never reach the user.

use async_trait::async_trait;
use book_finder_core::utils::truncate_str;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::time::Duration;
use teloxide::types::User;
use thiserror::Error;

/// Who sent a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    /// Telegram user id
    pub id: u64,
    /// `@handle`, if the user has one
    pub username: Option<String>,
    /// First name
    pub first_name: String,
    /// Last name, if set
    pub last_name: Option<String>,
}

impl Requester {
    /// Extract identity fields from a Telegram user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    /// First and last name joined by a space
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name)
                .trim()
                .to_string(),
            _ => self.first_name.clone(),
        }
    }
}

/// Text relayed to the audit chat
#[must_use]
pub fn audit_text(requester: &Requester, query: &str) -> String {
    format!(
        "New Query Received:\nUser ID: {}\nUsername: {}\nName: {}\nQuery: {query}",
        requester.id,
        requester.username.as_deref().unwrap_or("Unknown"),
        requester.full_name()
    )
}

/// Why a relay attempt failed
#[derive(Debug, Error)]
pub enum AuditError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Network(String),
    /// The Bot API answered with a non-200 status
    #[error("Audit relay rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },
}

/// Destination for relayed queries
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Relay one query.
    async fn notify(&self, requester: &Requester, query: &str) -> Result<(), AuditError>;
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Relays queries with a direct `sendMessage` call on a second bot token
pub struct TelegramAuditSink {
    http: HttpClient,
    endpoint: String,
    chat_id: i64,
}

impl TelegramAuditSink {
    /// Create a sink posting to `{api_url}/bot{token}/sendMessage`.
    #[must_use]
    pub fn new(api_url: &str, bot_token: &str, chat_id: i64, timeout: Duration) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            http,
            endpoint: format!(
                "{}/bot{bot_token}/sendMessage",
                api_url.trim_end_matches('/')
            ),
            chat_id,
        }
    }
}

#[async_trait]
impl AuditSink for TelegramAuditSink {
    async fn notify(&self, requester: &Requester, query: &str) -> Result<(), AuditError> {
        let text = audit_text(requester, query);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SendMessageBody {
                chat_id: self.chat_id,
                text: &text,
            })
            .send()
            .await
            .map_err(|e| AuditError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AuditError::Rejected {
                status: status.as_u16(),
                body: truncate_str(body, 500),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester() -> Requester {
        Requester {
            id: 42,
            username: Some("reader".to_string()),
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
        }
    }

    #[test]
    fn test_audit_text_layout() {
        assert_eq!(
            audit_text(&requester(), "Dune, Frank Herbert"),
            "New Query Received:\nUser ID: 42\nUsername: reader\nName: Ada Lovelace\nQuery: Dune, Frank Herbert"
        );
    }

    #[test]
    fn test_missing_optional_identity_fields() {
        let anonymous = Requester {
            username: None,
            last_name: None,
            ..requester()
        };
        let text = audit_text(&anonymous, "Dune");
        assert!(text.contains("Username: Unknown\n"));
        assert!(text.contains("Name: Ada\n"));
    }
}
