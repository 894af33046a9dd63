//! In-memory fakes for driving the conversation flows without Telegram or
//! the archive.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use book_finder_core::archive::{ArchiveApi, ArchiveError, BookRecord, DownloadLink, LinkStatus};
use book_finder_core::query::SearchQuery;
use book_finder_transport_telegram::bot::audit::{AuditError, AuditSink, Requester};
use book_finder_transport_telegram::bot::ReplySink;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup, MessageId};
use tokio::sync::Mutex;

/// One outbound reply as the user would see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Html(String),
    Menu {
        text: String,
        buttons: Vec<(String, String)>,
    },
    Edit(String),
    Sticker(String),
}

/// Message ids handed out to menus, unique across the test binary
static NEXT_MENU_ID: AtomicI32 = AtomicI32::new(1);

/// Records replies and hands every menu a fresh message id
#[derive(Default)]
pub struct RecordingReply {
    sent: Mutex<Vec<Sent>>,
    menu_ids: Mutex<Vec<MessageId>>,
}

impl RecordingReply {
    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    pub async fn last_menu_id(&self) -> MessageId {
        self.menu_ids
            .lock()
            .await
            .last()
            .copied()
            .expect("a menu was sent")
    }
}

#[async_trait]
impl ReplySink for RecordingReply {
    async fn send_html(&self, text: &str) -> Result<()> {
        self.sent.lock().await.push(Sent::Html(text.to_string()));
        Ok(())
    }

    async fn send_menu(&self, text: &str, keyboard: InlineKeyboardMarkup) -> Result<MessageId> {
        let buttons = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| {
                let payload = match &button.kind {
                    InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                    _ => String::new(),
                };
                (button.text.clone(), payload)
            })
            .collect();
        self.sent.lock().await.push(Sent::Menu {
            text: text.to_string(),
            buttons,
        });

        let id = MessageId(NEXT_MENU_ID.fetch_add(1, Ordering::SeqCst));
        self.menu_ids.lock().await.push(id);
        Ok(id)
    }

    async fn edit_html(&self, text: &str) -> Result<()> {
        self.sent.lock().await.push(Sent::Edit(text.to_string()));
        Ok(())
    }

    async fn send_sticker(&self, file_id: &str) -> Result<()> {
        self.sent
            .lock()
            .await
            .push(Sent::Sticker(file_id.to_string()));
        Ok(())
    }
}

/// Archive whose answers are keyed by query string and identifier.
/// Anything not scripted is empty: no matches, no PDF, 404 on every link check.
#[derive(Default)]
pub struct ScriptedArchive {
    searches: HashMap<String, Vec<BookRecord>>,
    failing_searches: Vec<String>,
    links: HashMap<String, DownloadLink>,
    failing_links: Vec<String>,
    head_statuses: HashMap<String, u16>,
    seen_queries: Mutex<Vec<(String, u32)>>,
}

impl ScriptedArchive {
    pub fn with_search(mut self, query: &str, records: Vec<BookRecord>) -> Self {
        self.searches.insert(query.to_string(), records);
        self
    }

    pub fn with_failing_search(mut self, query: &str) -> Self {
        self.failing_searches.push(query.to_string());
        self
    }

    pub fn with_link(mut self, identifier: &str, url: &str, head_status: u16) -> Self {
        self.links
            .insert(identifier.to_string(), DownloadLink::new(url));
        self.head_statuses.insert(url.to_string(), head_status);
        self
    }

    pub fn with_failing_link(mut self, identifier: &str) -> Self {
        self.failing_links.push(identifier.to_string());
        self
    }

    pub async fn seen_queries(&self) -> Vec<(String, u32)> {
        self.seen_queries.lock().await.clone()
    }
}

#[async_trait]
impl ArchiveApi for ScriptedArchive {
    async fn search_books(
        &self,
        query: &SearchQuery,
        rows: u32,
    ) -> Result<Vec<BookRecord>, ArchiveError> {
        let rendered = query.to_query_string();
        self.seen_queries.lock().await.push((rendered.clone(), rows));

        if self.failing_searches.contains(&rendered) {
            return Err(ArchiveError::Status {
                status: 503,
                url: "https://archive.test/advancedsearch.php".to_string(),
            });
        }
        Ok(self.searches.get(&rendered).cloned().unwrap_or_default())
    }

    async fn resolve_download_link(
        &self,
        identifier: &str,
    ) -> Result<Option<DownloadLink>, ArchiveError> {
        if self.failing_links.iter().any(|id| id == identifier) {
            return Err(ArchiveError::Network("connection reset".to_string()));
        }
        Ok(self.links.get(identifier).cloned())
    }

    async fn check_link(&self, link: &DownloadLink) -> Result<LinkStatus, ArchiveError> {
        let status = self.head_statuses.get(link.as_str()).copied().unwrap_or(404);
        Ok(LinkStatus::from_status(status))
    }

    fn read_online_url(&self, identifier: &str) -> String {
        format!("https://archive.test/details/{identifier}")
    }
}

/// Audit sink that remembers what it was asked to relay
#[derive(Default)]
pub struct RecordingAudit {
    fail: bool,
    relayed: Mutex<Vec<(u64, String)>>,
}

impl RecordingAudit {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn relayed(&self) -> Vec<(u64, String)> {
        self.relayed.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn notify(&self, requester: &Requester, query: &str) -> Result<(), AuditError> {
        self.relayed
            .lock()
            .await
            .push((requester.id, query.to_string()));
        if self.fail {
            return Err(AuditError::Network("audit bot unreachable".to_string()));
        }
        Ok(())
    }
}

pub fn requester() -> Requester {
    Requester {
        id: 42,
        username: Some("reader".to_string()),
        first_name: "Ada".to_string(),
        last_name: None,
    }
}
