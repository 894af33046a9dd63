//! Retry helpers and small string utilities.

use crate::archive::ArchiveError;
use crate::config::{ARCHIVE_BACKOFF_FACTOR_MS, ARCHIVE_MAX_BACKOFF_MS};
use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

/// Run an archive operation, retrying transient failures with exponential
/// backoff and jitter.
///
/// `max_retries` counts retries after the first attempt, so `0` runs the
/// operation exactly once. Non-transient errors (bad status, undecodable
/// body) are returned immediately.
///
/// # Errors
///
/// Returns the last error once retries are exhausted or a non-transient
/// error occurs.
///
/// # Examples
///
/// ```
/// use book_finder_core::archive::ArchiveError;
/// use book_finder_core::utils::retry_transient;
///
/// # async fn example() -> Result<(), ArchiveError> {
/// let rows = retry_transient(1, || async { Ok::<_, ArchiveError>(3) }).await?;
/// assert_eq!(rows, 3);
/// # Ok(())
/// # }
/// ```
pub async fn retry_transient<F, Fut, T>(max_retries: usize, operation: F) -> Result<T, ArchiveError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ArchiveError>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(2)
        .factor(ARCHIVE_BACKOFF_FACTOR_MS)
        .max_delay(Duration::from_millis(ARCHIVE_MAX_BACKOFF_MS))
        .map(jitter)
        .take(max_retries);

    RetryIf::spawn(retry_strategy, operation, ArchiveError::is_transient)
        .await
        .map_err(|e| {
            if e.is_transient() {
                warn!(
                    "Archive request failed after {} attempts: {}",
                    max_retries + 1,
                    e
                );
            }
            e
        })
}

/// Truncates a string to at most `max_chars` characters, respecting UTF-8
/// boundaries.
#[must_use]
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
