//! Host list, host detail and the fetch-and-store flow

use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};

use super::edit_or_send;
use crate::logger::{self, LogTag};
use crate::telegram::formatters::render;
use crate::telegram::keyboards;
use crate::telegram::polling::AppState;

/// Show the paginated list of the user's hosts
pub async fn send_hosts_list(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    user_id: i64,
    page: usize,
) -> Result<(), String> {
    let hosts = state
        .db
        .list_hosts(user_id)
        .map_err(|e| format!("Failed to list hosts: {}", e))?;

    edit_or_send(
        bot,
        chat_id,
        message_id,
        "💻 <b>Your hosts:</b>",
        keyboards::hosts_list(&hosts, page),
    )
    .await
}

/// Show the stored snapshot for one host, or a notice when it was never polled
pub async fn send_host_detail(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    user_id: i64,
    host_id: &str,
) -> Result<(), String> {
    let host_id: i64 = match host_id.parse() {
        Ok(id) => id,
        Err(_) => return Ok(()),
    };

    let info = state
        .db
        .find_host(Some(host_id), None)
        .map_err(|e| format!("Failed to load host: {}", e))?;
    let info = match info {
        Some(info) => info,
        None => {
            return edit_or_send(
                bot,
                chat_id,
                message_id,
                "❓ This host no longer exists.",
                keyboards::menu_button(),
            )
            .await;
        }
    };

    let actions = keyboards::host_actions(&info.host.ip, info.host.port);

    if info.host.last_checked.is_none() {
        return edit_or_send(
            bot,
            chat_id,
            message_id,
            "❓ You have not requested info for this host yet!",
            actions,
        )
        .await;
    }

    let short = user_prefers_short(state, user_id);
    edit_or_send(bot, chat_id, message_id, &render(&info, short), actions).await
}

/// Poll the host once, store the snapshot and show the result.
///
/// Fetch failures are rendered verbatim; nothing here retries.
pub async fn handle_fetch(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    user_id: i64,
    ip: &str,
    port: &str,
) -> Result<(), String> {
    let port: u16 = match port.parse() {
        Ok(port) => port,
        Err(_) => return Ok(()),
    };

    edit_or_send(
        bot,
        chat_id,
        message_id,
        &format!("⏳ Waiting for a response from {}:{} ...", ip, port),
        keyboards::menu_button(),
    )
    .await?;

    let snapshot = match state.probe.fetch(ip, port).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return edit_or_send(
                bot,
                chat_id,
                message_id,
                &format!("❌ Could not fetch data: {}", e),
                keyboards::menu_button(),
            )
            .await;
        }
    };

    if let Err(e) = state.db.overwrite_metrics(ip, &snapshot) {
        logger::error(LogTag::Telegram, &format!("Failed to store metrics: {}", e));
        return edit_or_send(
            bot,
            chat_id,
            message_id,
            &format!("❌ Could not store the snapshot: {}", e),
            keyboards::menu_button(),
        )
        .await;
    }

    let info = state
        .db
        .find_host(None, Some(ip))
        .map_err(|e| format!("Failed to reload host: {}", e))?;
    let info = match info {
        Some(info) => info,
        None => return Ok(()),
    };

    let short = user_prefers_short(state, user_id);
    edit_or_send(
        bot,
        chat_id,
        message_id,
        &render(&info, short),
        keyboards::host_actions(&info.host.ip, info.host.port),
    )
    .await
}

/// Current short/full preference; unknown users default to the full view
fn user_prefers_short(state: &AppState, user_id: i64) -> bool {
    match state.db.get_user(user_id) {
        Ok(Some(user)) => user.settings.short,
        Ok(None) => false,
        Err(e) => {
            logger::warning(LogTag::Telegram, &format!("Failed to load settings: {}", e));
            false
        }
    }
}
