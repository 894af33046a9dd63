use crate::bot::handlers::{
    get_user_id_safe, report_failure, requester_from_message, search_text, Command,
};
use crate::bot::{MenuFlow, RelaxedFlow, SessionStore, TelegramAuditSink, TelegramReply};
use crate::config::{BotSettings, BotVariant};
use book_finder_core::archive::{ArchiveApi, ArchiveClient};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let archive: Arc<dyn ArchiveApi> = Arc::new(ArchiveClient::new(settings.archive.as_ref()));
    info!("Archive client initialized ({}).", settings.archive.base_url());

    let bot = Bot::new(settings.telegram.telegram_token.clone());

    match settings.telegram.bot_variant {
        BotVariant::Menu => run_menu_bot(bot, archive, &settings).await,
        BotVariant::Relaxed => run_relaxed_bot(bot, archive, &settings).await,
    }
}

async fn run_menu_bot(bot: Bot, archive: Arc<dyn ArchiveApi>, settings: &BotSettings) {
    let sessions = init_sessions(settings);
    let flow = Arc::new(MenuFlow::new(
        archive,
        sessions,
        settings.archive.menu_search_rows,
    ));

    info!("Menu bot is running...");

    Dispatcher::builder(bot, setup_menu_handler())
        .dependencies(dptree::deps![flow])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn run_relaxed_bot(bot: Bot, archive: Arc<dyn ArchiveApi>, settings: &BotSettings) {
    let secrets = match settings.telegram.relaxed_secrets() {
        Ok(secrets) => secrets,
        Err(e) => {
            error!("Relaxed bot cannot start: {e}");
            std::process::exit(1);
        }
    };

    let audit = Arc::new(TelegramAuditSink::new(
        &settings.telegram.telegram_api_url,
        &secrets.audit_bot_token,
        secrets.audit_chat_id,
        settings.archive.timeout(),
    ));
    let flow = Arc::new(RelaxedFlow::new(
        archive,
        audit,
        secrets.sticker_file_id,
        settings.archive.relaxed_search_rows,
    ));

    info!("Relaxed bot is running...");

    Dispatcher::builder(bot, setup_relaxed_handler())
        .dependencies(dptree::deps![flow])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn init_sessions(settings: &BotSettings) -> SessionStore {
    let ttl = settings.telegram.session_ttl_secs;
    let max_size = settings.telegram.session_max_capacity;

    info!("Initializing SessionStore (ttl: {ttl}s, max_size: {max_size})");

    SessionStore::new(ttl, max_size)
}

fn setup_menu_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_menu_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_menu_command),
                )
                .branch(
                    dptree::filter(|msg: Message| search_text(&msg).is_some())
                        .endpoint(handle_menu_text),
                ),
        )
}

fn setup_relaxed_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_relaxed_command),
        )
        .branch(
            dptree::filter(|msg: Message| search_text(&msg).is_some())
                .endpoint(handle_relaxed_text),
        )
}

async fn handle_menu_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    flow: Arc<MenuFlow>,
) -> Result<(), teloxide::RequestError> {
    let reply = TelegramReply::new(bot, msg.chat.id);
    match cmd {
        Command::Start => {
            if let Err(e) = flow.start(&reply, msg.chat.id.0).await {
                error!("Failed to send welcome to chat {}: {e:#}", msg.chat.id);
            }
        }
    }
    respond(())
}

async fn handle_menu_text(
    bot: Bot,
    msg: Message,
    flow: Arc<MenuFlow>,
) -> Result<(), teloxide::RequestError> {
    let Some(text) = search_text(&msg) else {
        return respond(());
    };
    let user_id = get_user_id_safe(&msg);
    info!("Menu query from user {user_id}: {text:?}");

    let reply = TelegramReply::new(bot, msg.chat.id);
    if let Err(e) = flow.on_text(&reply, msg.chat.id.0, text).await {
        flow.fail_turn(&reply, msg.chat.id.0, user_id, &e).await;
    }
    respond(())
}

async fn handle_menu_callback(
    bot: Bot,
    q: CallbackQuery,
    flow: Arc<MenuFlow>,
) -> Result<(), teloxide::RequestError> {
    let user_id = q.from.id.0.cast_signed();

    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query for user {user_id}: {e}");
    }

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return respond(());
    };

    let chat_id = message.chat().id;
    let menu_id = message.id();
    let reply = TelegramReply::for_message(bot, chat_id, menu_id);
    if let Err(e) = flow.on_selection(&reply, chat_id.0, menu_id, data).await {
        flow.fail_turn(&reply, chat_id.0, user_id, &e).await;
    }
    respond(())
}

async fn handle_relaxed_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    flow: Arc<RelaxedFlow>,
) -> Result<(), teloxide::RequestError> {
    let reply = TelegramReply::new(bot, msg.chat.id);
    match cmd {
        Command::Start => {
            if let Err(e) = flow.start(&reply).await {
                error!("Failed to send welcome to chat {}: {e:#}", msg.chat.id);
            }
        }
    }
    respond(())
}

async fn handle_relaxed_text(
    bot: Bot,
    msg: Message,
    flow: Arc<RelaxedFlow>,
) -> Result<(), teloxide::RequestError> {
    let Some(text) = search_text(&msg) else {
        return respond(());
    };
    let user_id = get_user_id_safe(&msg);
    info!("Relaxed query from user {user_id}: {text:?}");

    let requester = requester_from_message(&msg);
    let reply = TelegramReply::new(bot, msg.chat.id);
    if let Err(e) = flow.on_text(&reply, requester.as_ref(), text).await {
        report_failure(&reply, user_id, &e).await;
    }
    respond(())
}
