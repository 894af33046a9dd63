//! Menu-driven search flow.
//!
//! A text message searches by title (and optional author) and renders the
//! matches as inline buttons; tapping one resolves that item's PDF link.

use crate::bot::handlers::report_failure;
use crate::bot::reply::ReplySink;
use crate::bot::state::{Selection, SessionState, SessionStore};
use crate::bot::views;
use anyhow::{Context, Result};
use book_finder_core::archive::ArchiveApi;
use book_finder_core::query::{QueryFields, SearchQuery};
use std::sync::Arc;
use teloxide::types::MessageId;
use tracing::{debug, info};

/// Menu flow shared by all chats of the process
#[derive(Clone)]
pub struct MenuFlow {
    archive: Arc<dyn ArchiveApi>,
    sessions: SessionStore,
    rows: u32,
}

impl MenuFlow {
    /// Create the flow; `rows` caps the number of buttons per search.
    #[must_use]
    pub fn new(archive: Arc<dyn ArchiveApi>, sessions: SessionStore, rows: u32) -> Self {
        Self {
            archive,
            sessions,
            rows,
        }
    }

    /// Session store backing this flow
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// `/start`: greet and forget any pending match list.
    ///
    /// # Errors
    ///
    /// Returns an error if the welcome message cannot be sent.
    pub async fn start(&self, reply: &dyn ReplySink, chat_id: i64) -> Result<()> {
        self.sessions.reset(chat_id).await;
        reply.send_html(views::MENU_WELCOME).await
    }

    /// Free text: search and offer the matches as buttons.
    ///
    /// Ignored while the chat still has a match list pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive search fails or a reply cannot be sent.
    pub async fn on_text(&self, reply: &dyn ReplySink, chat_id: i64, text: &str) -> Result<()> {
        if let SessionState::AwaitingSelection { .. } = self.sessions.get(chat_id).await {
            debug!("Chat {chat_id} is awaiting a selection; ignoring text message.");
            return Ok(());
        }

        reply.send_html(views::SEARCHING).await?;

        let query = SearchQuery::menu(&QueryFields::parse(text.trim()));
        if !query.has_terms() {
            return reply.send_html(views::NO_MATCHES).await;
        }

        let matches = self
            .archive
            .search_books(&query, self.rows)
            .await
            .with_context(|| format!("archive search failed for `{query}`"))?;

        info!(
            "Chat {chat_id}: search `{query}` returned {} matches.",
            matches.len()
        );

        if matches.is_empty() {
            return reply.send_html(views::NO_MATCHES).await;
        }

        let menu_id = reply
            .send_menu(views::MATCHES_FOUND, views::matches_keyboard(&matches))
            .await?;
        self.sessions.begin_selection(chat_id, menu_id, matches).await;
        Ok(())
    }

    /// Button tap on the keyboard of message `menu_id`: resolve the chosen
    /// match. Unless the keyboard is an older one, the chat ends up awaiting a
    /// new query.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata lookup fails or a reply cannot be sent.
    pub async fn on_selection(
        &self,
        reply: &dyn ReplySink,
        chat_id: i64,
        menu_id: MessageId,
        payload: &str,
    ) -> Result<()> {
        let record = match self.sessions.take_selection(chat_id, menu_id, payload).await {
            Selection::Chosen(record) => record,
            Selection::InvalidInput => {
                debug!("Chat {chat_id}: non-numeric selection payload {payload:?}.");
                return reply.edit_html(views::INVALID_INPUT).await;
            }
            Selection::OutOfRange => {
                debug!("Chat {chat_id}: selection {payload:?} is out of range.");
                return reply.edit_html(views::INVALID_SELECTION).await;
            }
            Selection::Stale => {
                debug!("Chat {chat_id}: tap on outdated keyboard {menu_id:?}.");
                return reply.edit_html(views::INVALID_SELECTION).await;
            }
        };

        reply.edit_html(&views::fetching_link(&record)).await?;

        let link = self
            .archive
            .resolve_download_link(&record.identifier)
            .await
            .with_context(|| format!("metadata lookup failed for {}", record.identifier))?;

        match link {
            Some(link) => {
                info!("Chat {chat_id}: resolved {} to {link}.", record.identifier);
                reply.edit_html(&views::download_link_found(&link)).await
            }
            None => {
                info!("Chat {chat_id}: no PDF in {}.", record.identifier);
                reply.edit_html(views::LINK_NOT_FOUND).await
            }
        }
    }

    /// Close a failed turn: forget any pending match list and tell the user
    /// the service is unavailable.
    pub async fn fail_turn(
        &self,
        reply: &dyn ReplySink,
        chat_id: i64,
        user_id: i64,
        err: &anyhow::Error,
    ) {
        self.sessions.reset(chat_id).await;
        report_failure(reply, user_id, err).await;
    }
}
