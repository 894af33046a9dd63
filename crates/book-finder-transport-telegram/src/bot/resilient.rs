//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Every reply the bots send goes through these wrappers so a transient
//! network failure does not lose a search result.

use crate::utils::retry_telegram_operation;
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, FileId, InlineKeyboardMarkup, InputFile, Message, MessageId, ParseMode,
};
use tracing::debug;

const ERROR_NOT_MODIFIED: &str = "message is not modified";

/// Send an HTML message, optionally with an inline keyboard.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_html_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Message> {
    retry_telegram_operation(|| async {
        let mut req = bot
            .send_message(chat_id, text.to_string())
            .parse_mode(ParseMode::Html);
        if let Some(markup) = keyboard.clone() {
            req = req.reply_markup(markup);
        }
        req.await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Replace the text of an existing message (removing its inline keyboard).
///
/// "Message is not modified" is treated as success.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn edit_html_resilient(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    text: &str,
) -> Result<()> {
    let result = retry_telegram_operation(|| async {
        bot.edit_message_text(chat_id, msg_id, text.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| anyhow::anyhow!("Telegram edit error: {e}"))
    })
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if e.to_string().contains(ERROR_NOT_MODIFIED) => {
            debug!("Message update skipped: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Send a sticker by its Telegram file id.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_sticker_resilient(bot: &Bot, chat_id: ChatId, file_id: &str) -> Result<Message> {
    retry_telegram_operation(|| async {
        bot.send_sticker(chat_id, InputFile::file_id(FileId(file_id.to_string())))
            .await
            .map_err(|e| anyhow::anyhow!("Telegram sticker error: {e}"))
    })
    .await
}
