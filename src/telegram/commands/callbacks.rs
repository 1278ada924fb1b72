//! Callback query handlers for inline keyboard buttons
//!
//! Every button press lands here; the colon-separated callback data selects
//! the handler through one explicit dispatch table.

use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

use super::{edit_or_send, hosts, onboarding, WELCOME_MESSAGE};
use crate::logger::{self, LogTag};
use crate::telegram::keyboards;
use crate::telegram::polling::AppState;

/// Handle a callback query from an inline keyboard button
pub async fn handle_callback_query(
    bot: &Bot,
    state: &AppState,
    query: CallbackQuery,
) -> Result<(), String> {
    // Always answer first to remove the client-side loading indicator
    bot.answer_callback_query(&query.id)
        .await
        .map_err(|e| format!("Failed to answer callback: {}", e))?;

    let (chat_id, message_id) = match query.message.as_ref() {
        Some(message) => (message.chat().id, Some(message.id())),
        None => {
            logger::debug(LogTag::Telegram, "Callback without message context");
            return Ok(());
        }
    };
    // The chat id is the owning identity, same as in the message handlers
    let user_id = chat_id.0;
    let data = query.data.as_deref().unwrap_or("");
    let parts: Vec<&str> = data.split(':').collect();

    match parts.as_slice() {
        // Menu navigation
        ["menu", "main"] => {
            edit_or_send(bot, chat_id, message_id, WELCOME_MESSAGE, keyboards::main_menu()).await
        }
        ["menu", "hosts"] => {
            hosts::send_hosts_list(bot, state, chat_id, message_id, user_id, 1).await
        }
        ["hosts", "page", page] => {
            let page = page.parse::<usize>().unwrap_or(1);
            hosts::send_hosts_list(bot, state, chat_id, message_id, user_id, page).await
        }

        // Host detail & fetch. The fetch target may be an IPv6 address, so
        // everything after the tag is re-joined and split at the last colon.
        ["host", host_id] => {
            hosts::send_host_detail(bot, state, chat_id, message_id, user_id, host_id).await
        }
        ["fetch", target @ ..] if !target.is_empty() => {
            let joined = target.join(":");
            match joined.rsplit_once(':') {
                Some((ip, port)) => {
                    hosts::handle_fetch(bot, state, chat_id, message_id, user_id, ip, port).await
                }
                None => Ok(()),
            }
        }

        // Add-host flow
        ["add", "start"] => onboarding::start_flow(bot, chat_id, message_id).await,
        ["add", "cancel"] => onboarding::cancel_flow(bot, chat_id, message_id).await,
        ["add", "back", "name"] => onboarding::back_to_name(bot, chat_id, message_id).await,
        ["add", "back", "ip"] => onboarding::back_to_ip(bot, chat_id, message_id).await,

        // Settings
        ["menu", "settings"] => {
            edit_or_send(
                bot,
                chat_id,
                message_id,
                "⚙️ <b>Settings</b>",
                keyboards::settings_menu(),
            )
            .await
        }
        ["settings", "toggle"] => handle_format_toggle(bot, state, chat_id, message_id, user_id).await,

        ["noop"] => Ok(()),

        _ => {
            logger::debug(LogTag::Telegram, &format!("Unknown callback: {}", data));
            Ok(())
        }
    }
}

/// Flip the user's short/full preference and echo the new mode
async fn handle_format_toggle(
    bot: &Bot,
    state: &AppState,
    chat_id: teloxide::types::ChatId,
    message_id: Option<teloxide::types::MessageId>,
    user_id: i64,
) -> Result<(), String> {
    let new_short = state
        .db
        .toggle_short_format(user_id)
        .map_err(|e| format!("Failed to toggle format: {}", e))?;

    // A missing user row means the chat skipped /start; register it and keep
    // the default full format.
    let short = match new_short {
        Some(short) => short,
        None => {
            state
                .db
                .ensure_user(user_id)
                .map_err(|e| format!("Failed to register user: {}", e))?;
            false
        }
    };

    let mode = if short { "short" } else { "full" };
    let text = format!("🔄 Info format switched to <b>{}</b>", mode);
    edit_or_send(bot, chat_id, message_id, &text, keyboards::settings_menu()).await
}
