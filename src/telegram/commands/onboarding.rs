//! Add-host flow: name → IP → port → commit
//!
//! Each step replaces the active prompt message instead of appending to the
//! chat; the session tracks which message is the current prompt. Validation
//! failures re-issue the prompt without advancing the flow.

use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, Message, MessageId, ParseMode};

use super::edit_or_send;
use crate::database::RegistryError;
use crate::logger::{self, LogTag};
use crate::telegram::keyboards;
use crate::telegram::polling::AppState;
use crate::telegram::session::{get_session_manager, AddHostStage};
use crate::utils::{is_valid_ip, parse_port};

const NAME_PROMPT: &str = "🔧 Send a name for your host";
const IP_PROMPT: &str = "✅ Great! Now send the host's IP address";
const PORT_PROMPT: &str = "✅ IP accepted! Now send the host's port (0 to 65535):";
const INVALID_IP: &str = "❌ That is not a valid IP address! Try again.";
const INVALID_PORT: &str = "❌ The port must be a number from 0 to 65535! Try again.";
const HOST_EXISTS: &str = "❌ A host with this IP and port already exists!";
const ADD_FAILED: &str = "❌ Something went wrong while adding the host. Try again later.";
const CANCELLED: &str = "❌ Host setup cancelled.";

// ============================================================================
// CALLBACK TRANSITIONS
// ============================================================================

/// Begin the flow: the pressed menu message becomes the name prompt
pub async fn start_flow(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), String> {
    let manager = get_session_manager();
    manager.start(chat_id.0).await;

    edit_or_send(bot, chat_id, message_id, NAME_PROMPT, keyboards::cancel()).await?;
    if let Some(id) = message_id {
        manager.set_prompt(chat_id.0, id).await;
    }
    Ok(())
}

/// Abort the flow and drop everything collected so far
pub async fn cancel_flow(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), String> {
    get_session_manager().clear(chat_id.0).await;
    logger::debug(
        LogTag::Telegram,
        &format!("Add-host flow cancelled in chat {}", chat_id.0),
    );
    edit_or_send(bot, chat_id, message_id, CANCELLED, keyboards::main_menu()).await
}

/// Back from the IP prompt to the name prompt
pub async fn back_to_name(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), String> {
    let manager = get_session_manager();
    if manager.get(chat_id.0).await.is_none() {
        return Ok(());
    }
    manager.back_to_name(chat_id.0).await;

    edit_or_send(bot, chat_id, message_id, NAME_PROMPT, keyboards::cancel()).await?;
    if let Some(id) = message_id {
        manager.set_prompt(chat_id.0, id).await;
    }
    Ok(())
}

/// Back from the port prompt to the IP prompt
pub async fn back_to_ip(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), String> {
    let manager = get_session_manager();
    if manager.get(chat_id.0).await.is_none() {
        return Ok(());
    }
    manager.back_to_ip(chat_id.0).await;

    edit_or_send(
        bot,
        chat_id,
        message_id,
        IP_PROMPT,
        keyboards::cancel_and_back("add:back:name"),
    )
    .await?;
    if let Some(id) = message_id {
        manager.set_prompt(chat_id.0, id).await;
    }
    Ok(())
}

// ============================================================================
// TEXT INPUT
// ============================================================================

/// Route free-text input to the step the session is waiting on
pub async fn handle_session_input(
    bot: &Bot,
    state: &AppState,
    message: &Message,
    text: &str,
) -> Result<(), String> {
    let chat_id = message.chat.id;
    let manager = get_session_manager();
    let session = match manager.get(chat_id.0).await {
        Some(session) => session,
        None => return Ok(()),
    };

    // The user's input is consumed by the flow; it never stays in the chat
    let _ = bot.delete_message(chat_id, message.id).await;

    match session.stage {
        AddHostStage::AwaitingName => {
            // Names are stored verbatim
            manager.set_name(chat_id.0, text.to_string()).await;
            replace_prompt(
                bot,
                chat_id,
                IP_PROMPT,
                keyboards::cancel_and_back("add:back:name"),
            )
            .await
        }
        AddHostStage::AwaitingIp => {
            if is_valid_ip(text) {
                manager.set_ip(chat_id.0, text.to_string()).await;
                replace_prompt(
                    bot,
                    chat_id,
                    PORT_PROMPT,
                    keyboards::cancel_and_back("add:back:ip"),
                )
                .await
            } else {
                logger::debug(
                    LogTag::Telegram,
                    &format!("Rejected IP input in chat {}", chat_id.0),
                );
                replace_prompt(
                    bot,
                    chat_id,
                    INVALID_IP,
                    keyboards::cancel_and_back("add:back:name"),
                )
                .await
            }
        }
        AddHostStage::AwaitingPort => match parse_port(text) {
            Some(port) => {
                // The chat id is the owning identity
                let user_id = chat_id.0;
                commit_host(bot, state, chat_id, user_id, &session.name, &session.ip, port).await
            }
            None => {
                logger::debug(
                    LogTag::Telegram,
                    &format!("Rejected port input in chat {}", chat_id.0),
                );
                replace_prompt(
                    bot,
                    chat_id,
                    INVALID_PORT,
                    keyboards::cancel_and_back("add:back:ip"),
                )
                .await
            }
        },
    }
}

/// Final step: register the host (or end as a no-op when it already exists)
async fn commit_host(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    user_id: i64,
    name: &Option<String>,
    ip: &Option<String>,
    port: u16,
) -> Result<(), String> {
    let manager = get_session_manager();
    let (name, ip) = match (name, ip) {
        (Some(name), Some(ip)) => (name.clone(), ip.clone()),
        // A session in the port stage always has both; drop it if not
        _ => {
            manager.clear(chat_id.0).await;
            return Ok(());
        }
    };

    // Same IP and same port: nothing to do, the flow just ends
    match state.db.find_host(None, Some(&ip)) {
        Ok(Some(existing)) if existing.host.port == port => {
            manager.clear(chat_id.0).await;
            return finish(bot, chat_id, HOST_EXISTS).await;
        }
        Ok(_) => {}
        Err(e) => {
            logger::error(LogTag::Telegram, &format!("Host lookup failed: {}", e));
            manager.clear(chat_id.0).await;
            return finish(bot, chat_id, ADD_FAILED).await;
        }
    }

    match state.db.register_host(user_id, &name, &ip, port) {
        Ok(host) => {
            manager.clear(chat_id.0).await;
            let text = format!(
                "✅ Host added!\n\
                 🖥️ Name: <code>{}</code>\n\
                 🌐 IP: <code>{}</code>\n\
                 🔌 Port: <code>{}</code>",
                host.name, host.ip, host.port
            );
            finish(bot, chat_id, &text).await
        }
        Err(e @ RegistryError::DuplicateHost { .. }) => {
            manager.clear(chat_id.0).await;
            finish(bot, chat_id, &format!("❌ {}", e)).await
        }
        Err(e) => {
            logger::error(LogTag::Telegram, &format!("Host registration failed: {}", e));
            manager.clear(chat_id.0).await;
            finish(bot, chat_id, ADD_FAILED).await
        }
    }
}

// ============================================================================
// PROMPT REPLACEMENT
// ============================================================================

/// Delete the previous prompt and show a new one, keeping exactly one active
/// prompt message in the chat.
async fn replace_prompt(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    keyboard: InlineKeyboardMarkup,
) -> Result<(), String> {
    let manager = get_session_manager();
    let previous = manager.get(chat_id.0).await.and_then(|s| s.prompt_message_id);

    let sent = bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await
        .map_err(|e| format!("Failed to send prompt: {}", e))?;
    manager.set_prompt(chat_id.0, sent.id).await;

    if let Some(previous) = previous {
        // Best effort: an already-deleted prompt is fine
        let _ = bot.delete_message(chat_id, previous).await;
    }
    Ok(())
}

/// Terminal message of the flow, back on the main menu
async fn finish(bot: &Bot, chat_id: ChatId, text: &str) -> Result<(), String> {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await
        .map_err(|e| format!("Failed to send result: {}", e))?;
    Ok(())
}
