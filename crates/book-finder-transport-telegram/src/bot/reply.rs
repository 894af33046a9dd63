//! Outbound reply abstraction.
//!
//! The flows only talk to a [`ReplySink`]; [`TelegramReply`] binds one to a
//! chat (and, for button taps, to the menu message being answered).

use crate::bot::resilient::{edit_html_resilient, send_html_resilient, send_sticker_resilient};
use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId};

/// Where a conversation turn writes its replies
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Send a new HTML message.
    async fn send_html(&self, text: &str) -> Result<()>;

    /// Send a new HTML message with an inline keyboard, returning the id of
    /// the sent message.
    async fn send_menu(&self, text: &str, keyboard: InlineKeyboardMarkup) -> Result<MessageId>;

    /// Replace the message this turn responds to, or send a new one when
    /// there is none.
    async fn edit_html(&self, text: &str) -> Result<()>;

    /// Send a sticker by file id.
    async fn send_sticker(&self, file_id: &str) -> Result<()>;
}

/// Telegram-backed reply sink for a single chat
pub struct TelegramReply {
    bot: Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
}

impl TelegramReply {
    /// Reply sink for a plain incoming message.
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            message_id: None,
        }
    }

    /// Reply sink that edits `message_id` (the message carrying the tapped
    /// keyboard).
    #[must_use]
    pub const fn for_message(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            message_id: Some(message_id),
        }
    }
}

#[async_trait]
impl ReplySink for TelegramReply {
    async fn send_html(&self, text: &str) -> Result<()> {
        send_html_resilient(&self.bot, self.chat_id, text, None).await?;
        Ok(())
    }

    async fn send_menu(&self, text: &str, keyboard: InlineKeyboardMarkup) -> Result<MessageId> {
        let msg = send_html_resilient(&self.bot, self.chat_id, text, Some(keyboard)).await?;
        Ok(msg.id)
    }

    async fn edit_html(&self, text: &str) -> Result<()> {
        match self.message_id {
            Some(msg_id) => edit_html_resilient(&self.bot, self.chat_id, msg_id, text).await,
            None => self.send_html(text).await,
        }
    }

    async fn send_sticker(&self, file_id: &str) -> Result<()> {
        send_sticker_resilient(&self.bot, self.chat_id, file_id).await?;
        Ok(())
    }
}
