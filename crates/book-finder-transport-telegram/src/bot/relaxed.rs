//! Progressive relaxation search flow.
//!
//! One message runs the whole search: the strictest field combination first,
//! then one trailing field fewer at a time until something is found. Every
//! match is resolved and its link checked before it is reported.

use crate::bot::audit::{AuditSink, Requester};
use crate::bot::reply::ReplySink;
use crate::bot::views;
use anyhow::{Context, Result};
use book_finder_core::archive::{ArchiveApi, ArchiveError, BookRecord, DownloadLink, LinkStatus};
use book_finder_core::query::{QueryFields, SearchQuery};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to tell the user about one match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The PDF answered 200
    Download(DownloadLink),
    /// No PDF, or the PDF answered 403
    ReadOnline,
    /// The PDF answered something else; nothing is sent
    Skipped(u16),
}

/// Relaxed flow shared by all chats of the process
#[derive(Clone)]
pub struct RelaxedFlow {
    archive: Arc<dyn ArchiveApi>,
    audit: Arc<dyn AuditSink>,
    sticker_file_id: String,
    rows: u32,
}

impl RelaxedFlow {
    /// Create the flow; `rows` caps the matches resolved per search.
    #[must_use]
    pub fn new(
        archive: Arc<dyn ArchiveApi>,
        audit: Arc<dyn AuditSink>,
        sticker_file_id: impl Into<String>,
        rows: u32,
    ) -> Self {
        Self {
            archive,
            audit,
            sticker_file_id: sticker_file_id.into(),
            rows,
        }
    }

    /// `/start`: explain the five-field format.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn start(&self, reply: &dyn ReplySink) -> Result<()> {
        reply.send_html(views::RELAXED_WELCOME).await
    }

    /// Free text: relay the query, then search with progressively fewer
    /// fields and report every usable match of the first non-empty result.
    ///
    /// # Errors
    ///
    /// Returns an error if an archive search fails or a reply cannot be sent.
    pub async fn on_text(
        &self,
        reply: &dyn ReplySink,
        requester: Option<&Requester>,
        text: &str,
    ) -> Result<()> {
        let text = text.trim();

        if let Some(requester) = requester {
            if let Err(e) = self.audit.notify(requester, text).await {
                warn!("Failed to relay query from user {}: {e}", requester.id);
            }
        }

        reply.send_html(views::SEARCHING).await?;

        for fields in QueryFields::parse(text).relaxations() {
            reply
                .send_html(&views::trying_with(&fields.display()))
                .await?;

            let query = SearchQuery::relaxed(&fields);
            let matches = self
                .archive
                .search_books(&query, self.rows)
                .await
                .with_context(|| format!("archive search failed for `{query}`"))?;

            if matches.is_empty() {
                debug!("No matches for `{query}`; dropping the last field.");
                continue;
            }

            info!("Search `{query}` returned {} matches.", matches.len());
            for record in &matches {
                self.report(reply, record).await?;
            }
            return reply.send_sticker(&self.sticker_file_id).await;
        }

        info!("No matches for any combination of {text:?}.");
        reply.send_html(views::NO_MATCHES_AFTER_RELAXING).await?;
        reply.send_sticker(&self.sticker_file_id).await
    }

    /// Decide how a single match should be presented.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata lookup or the link check fails.
    pub async fn classify(&self, record: &BookRecord) -> Result<RecordOutcome, ArchiveError> {
        let Some(link) = self
            .archive
            .resolve_download_link(&record.identifier)
            .await?
        else {
            return Ok(RecordOutcome::ReadOnline);
        };

        Ok(match self.archive.check_link(&link).await? {
            LinkStatus::Reachable => RecordOutcome::Download(link),
            LinkStatus::Forbidden => RecordOutcome::ReadOnline,
            LinkStatus::Other(status) => RecordOutcome::Skipped(status),
        })
    }

    async fn report(&self, reply: &dyn ReplySink, record: &BookRecord) -> Result<()> {
        match self.classify(record).await {
            Ok(RecordOutcome::Download(link)) => {
                reply
                    .send_html(&views::download_reply(record, &link))
                    .await
            }
            Ok(RecordOutcome::ReadOnline) => {
                let url = self.archive.read_online_url(&record.identifier);
                reply
                    .send_html(&views::read_online_reply(record, &url))
                    .await
            }
            Ok(RecordOutcome::Skipped(status)) => {
                debug!("Skipping {}: download link answered {status}.", record.identifier);
                Ok(())
            }
            Err(e) => {
                warn!("Skipping {}: {e}", record.identifier);
                Ok(())
            }
        }
    }
}
