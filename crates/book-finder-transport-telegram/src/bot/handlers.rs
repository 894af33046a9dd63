use crate::bot::audit::Requester;
use crate::bot::reply::ReplySink;
use crate::bot::views;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{error, warn};

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Identity of the message sender, if Telegram supplied one
#[must_use]
pub fn requester_from_message(msg: &Message) -> Option<Requester> {
    msg.from.as_ref().map(Requester::from_user)
}

/// Free text that should start a search (commands are routed elsewhere)
#[must_use]
pub fn search_text(msg: &Message) -> Option<&str> {
    msg.text().filter(|text| !text.starts_with('/'))
}

/// Log a failed turn and tell the user the service is unavailable.
pub async fn report_failure(reply: &dyn ReplySink, user_id: i64, err: &anyhow::Error) {
    error!("Turn failed for user {user_id}: {err:#}");
    if let Err(e) = reply.send_html(views::SERVICE_UNAVAILABLE).await {
        warn!("Failed to notify user {user_id} about the failure: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_command_parses() {
        assert_eq!(Command::parse("/start", "book_finder_bot").ok(), Some(Command::Start));
        assert!(Command::parse("/search dune", "book_finder_bot").is_err());
    }

    #[test]
    fn test_descriptions_list_start() {
        assert!(Command::descriptions().to_string().contains("/start"));
    }
}
