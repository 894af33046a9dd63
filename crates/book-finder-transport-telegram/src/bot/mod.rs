/// Side-channel notification of incoming queries
pub mod audit;
/// Teloxide-facing commands and identity helpers
pub mod handlers;
/// Menu-driven search flow (pick a match from inline buttons)
pub mod menu;
/// Progressive relaxation search flow (stateless)
pub mod relaxed;
/// Outbound reply abstraction and its Telegram implementation
pub mod reply;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// Per-chat session state for the menu flow
pub mod state;
/// User-facing texts and keyboards
pub mod views;

pub use audit::{AuditSink, Requester, TelegramAuditSink};
pub use menu::MenuFlow;
pub use relaxed::RelaxedFlow;
pub use reply::{ReplySink, TelegramReply};
pub use state::SessionStore;
