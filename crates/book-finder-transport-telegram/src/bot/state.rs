//! Per-chat session state for the menu flow.
//!
//! Sessions live in a [`moka`] cache so chats that never finish a selection
//! are evicted after the configured TTL instead of piling up.

use book_finder_core::archive::BookRecord;
use moka::future::Cache;
use std::time::Duration;
use teloxide::types::MessageId;

/// Where a chat is in the menu conversation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a search text
    #[default]
    AwaitingQuery,
    /// A match list was sent; waiting for a button tap
    AwaitingSelection {
        /// Message carrying the keyboard for `matches`
        menu_id: MessageId,
        /// Matches in the order their buttons were rendered
        matches: Vec<BookRecord>,
    },
}

/// Result of interpreting a button payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Payload pointed at a stored match
    Chosen(BookRecord),
    /// Payload is not an integer
    InvalidInput,
    /// Integer outside `1..=matches.len()` (or nothing stored)
    OutOfRange,
    /// Tap on a keyboard other than the one for the stored list
    Stale,
}

/// Map a 1-based button payload onto the match list.
///
/// # Examples
///
/// ```
/// use book_finder_core::archive::BookRecord;
/// use book_finder_transport_telegram::bot::state::{resolve_selection, Selection};
///
/// let matches = vec![BookRecord::new("Dune", "Frank Herbert", "dune00")];
/// assert_eq!(resolve_selection(&matches, "1"), Selection::Chosen(matches[0].clone()));
/// assert_eq!(resolve_selection(&matches, "2"), Selection::OutOfRange);
/// assert_eq!(resolve_selection(&matches, "one"), Selection::InvalidInput);
/// ```
#[must_use]
pub fn resolve_selection(matches: &[BookRecord], payload: &str) -> Selection {
    let Ok(index) = payload.trim().parse::<i64>() else {
        return Selection::InvalidInput;
    };

    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| matches.get(i))
        .cloned()
        .map_or(Selection::OutOfRange, Selection::Chosen)
}

/// Session store keyed by chat id
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<i64, SessionState>,
}

impl SessionStore {
    /// Creates a store whose entries expire `ttl_secs` after they were last
    /// written, holding at most `max_capacity` chats.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_finder_transport_telegram::bot::SessionStore;
    ///
    /// let sessions = SessionStore::new(
    ///     3600,   // 1 hour TTL
    ///     10_000  // max 10k chats
    /// );
    /// ```
    #[must_use]
    pub fn new(ttl_secs: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Current state of a chat; unknown chats are awaiting a query.
    pub async fn get(&self, chat_id: i64) -> SessionState {
        self.cache.get(&chat_id).await.unwrap_or_default()
    }

    /// Remember the match list just rendered as `menu_id` for a chat.
    pub async fn begin_selection(
        &self,
        chat_id: i64,
        menu_id: MessageId,
        matches: Vec<BookRecord>,
    ) {
        self.cache
            .insert(chat_id, SessionState::AwaitingSelection { menu_id, matches })
            .await;
    }

    /// Interpret a button payload tapped on `menu_id` against the stored list.
    ///
    /// A tap on an older keyboard is [`Selection::Stale`] and leaves the
    /// stored list alone. Otherwise the chat is back in
    /// [`SessionState::AwaitingQuery`] afterwards, whatever the outcome, so a
    /// list can be used for one selection only.
    pub async fn take_selection(
        &self,
        chat_id: i64,
        menu_id: MessageId,
        payload: &str,
    ) -> Selection {
        if let Some(SessionState::AwaitingSelection { menu_id: current, .. }) =
            self.cache.get(&chat_id).await
        {
            if current != menu_id {
                return Selection::Stale;
            }
        }

        let matches = match self.cache.remove(&chat_id).await {
            Some(SessionState::AwaitingSelection { matches, .. }) => matches,
            Some(SessionState::AwaitingQuery) | None => Vec::new(),
        };
        resolve_selection(&matches, payload)
    }

    /// Put a chat back into [`SessionState::AwaitingQuery`].
    pub async fn reset(&self, chat_id: i64) {
        self.cache.invalidate(&chat_id).await;
    }

    /// Returns the current number of stored sessions
    ///
    /// Useful for monitoring.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
