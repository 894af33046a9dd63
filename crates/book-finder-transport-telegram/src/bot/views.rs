//! User-facing texts and keyboards.
//!
//! All messages are Telegram HTML. Anything that comes from the user or the
//! archive is escaped before it is embedded.

use book_finder_core::archive::{BookRecord, DownloadLink};
use html_escape::{encode_double_quoted_attribute, encode_text};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// ─────────────────────────────────────────────────────────────────────────────
// Fixed messages
// ─────────────────────────────────────────────────────────────────────────────

/// `/start` reply of the menu bot
pub const MENU_WELCOME: &str = "📚 <b>Welcome to the Book Finder Bot!</b> 📚\n\n\
Send me the name of a book (and optionally the author) to search for it.";

/// `/start` reply of the relaxed bot
pub const RELAXED_WELCOME: &str = "📚 <b>Welcome to the Book Finder Bot!</b> 📚\n\n\
Send me the details of the book you're looking for:\n\
Format: <code>Book Name, Author Name, Year, Language, Subject</code>\n\
Example: <code>The Secret, Rhonda Byrne, 2006, eng, Self-Help</code>\n\n\
<b>Note:</b> All fields are optional except the book name.";

/// Sent before the first archive call of a turn
pub const SEARCHING: &str = "🔍 <b>Searching for your book...</b>";

/// Menu bot: the search returned nothing
pub const NO_MATCHES: &str = "❌ <b>No matches found. Please try again.</b>";

/// Menu bot: header above the match buttons
pub const MATCHES_FOUND: &str = "📚 <b>Found the following matches:</b>";

/// Menu bot: button payload is not a number
pub const INVALID_INPUT: &str = "❌ <b>Invalid input. Please try again.</b>";

/// Menu bot: button payload is outside the stored list
pub const INVALID_SELECTION: &str = "❌ <b>Invalid selection. Please try again.</b>";

/// Menu bot: the chosen item has no readable PDF
pub const LINK_NOT_FOUND: &str = "❌ <b>Could not retrieve a valid download link.</b>";

/// Relaxed bot: every field combination came back empty
pub const NO_MATCHES_AFTER_RELAXING: &str = "❌ <b>No matches found after trying all combinations. \
Please check for spelling mistakes or try a different query.</b>";

/// A turn failed because the archive could not be reached
pub const SERVICE_UNAVAILABLE: &str =
    "⚠️ <b>The book service is unavailable right now. Please try again later.</b>";

// ─────────────────────────────────────────────────────────────────────────────
// Menu bot
// ─────────────────────────────────────────────────────────────────────────────

/// Button label for the match at 1-based `index`
#[must_use]
pub fn selection_label(index: usize, record: &BookRecord) -> String {
    format!("{index}. {} by {}", record.title, record.author)
}

/// One button per match, each on its own row, with the 1-based index as
/// callback payload.
///
/// # Examples
///
/// ```
/// use book_finder_core::archive::BookRecord;
/// use book_finder_transport_telegram::bot::views::matches_keyboard;
///
/// let keyboard = matches_keyboard(&[BookRecord::new("Dune", "Frank Herbert", "dune00")]);
/// assert_eq!(keyboard.inline_keyboard[0][0].text, "1. Dune by Frank Herbert");
/// ```
#[must_use]
pub fn matches_keyboard(matches: &[BookRecord]) -> InlineKeyboardMarkup {
    let rows = matches.iter().enumerate().map(|(i, record)| {
        let index = i + 1;
        vec![InlineKeyboardButton::callback(
            selection_label(index, record),
            index.to_string(),
        )]
    });
    InlineKeyboardMarkup::new(rows)
}

/// Shown while the metadata of the chosen match is fetched
#[must_use]
pub fn fetching_link(record: &BookRecord) -> String {
    format!(
        "⏳ <b>Fetching download link for:</b> <code>{}</code> by <code>{}</code>...",
        encode_text(&record.title),
        encode_text(&record.author)
    )
}

/// Final menu reply when a PDF was found
#[must_use]
pub fn download_link_found(link: &DownloadLink) -> String {
    format!(
        "✅ <b>Download link for the PDF:</b> <a href=\"{}\">Click here</a>",
        encode_double_quoted_attribute(link.as_str())
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Relaxed bot
// ─────────────────────────────────────────────────────────────────────────────

/// Announces the field combination about to be searched
#[must_use]
pub fn trying_with(fields: &str) -> String {
    format!("🔎 Trying with: <code>{}</code>", encode_text(fields))
}

/// A downloadable match
#[must_use]
pub fn download_reply(record: &BookRecord, link: &DownloadLink) -> String {
    format!(
        "✅ <a href=\"{}\">{} by {}</a> - <b>Click to Download</b>",
        encode_double_quoted_attribute(link.as_str()),
        encode_text(&record.title),
        encode_text(&record.author)
    )
}

/// A match that can only be read on the archive's reader page
#[must_use]
pub fn read_online_reply(record: &BookRecord, url: &str) -> String {
    format!(
        "⚠️ <b>{} by {}</b> can't be downloaded, but can be read here: <a href=\"{}\">Read Online</a>",
        encode_text(&record.title),
        encode_text(&record.author),
        encode_double_quoted_attribute(url)
    )
}
