//! Update polling for the bot
//!
//! Long-polls `getUpdates` and dispatches every update to the command
//! handlers. The offset is tracked so no update is processed twice; transient
//! poll errors are logged and retried, never fatal.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{Update, UpdateKind};
use tokio::sync::Notify;

use crate::database::Database;
use crate::logger::{self, LogTag};
use crate::probe::ProbeClient;
use crate::telegram::commands;

/// Shared collaborators every handler needs
pub struct AppState {
    pub db: Database,
    pub probe: ProbeClient,
}

/// Run the polling loop until the shutdown notifier fires
pub async fn run_polling(bot: Bot, state: Arc<AppState>, shutdown: Arc<Notify>) {
    let offset = AtomicI64::new(0);
    logger::info(LogTag::Telegram, "Update polling started");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                logger::info(LogTag::Telegram, "Update polling received shutdown signal");
                break;
            }
            _ = poll_once(&bot, &state, &offset) => {
                // Continue polling
            }
        }
    }

    logger::info(LogTag::Telegram, "Update polling stopped");
}

/// One getUpdates round trip
async fn poll_once(bot: &Bot, state: &AppState, offset: &AtomicI64) {
    let current_offset = offset.load(Ordering::SeqCst);
    let mut request = bot.get_updates().timeout(10);
    if current_offset > 0 {
        request = request.offset(current_offset as i32);
    }

    match request.await {
        Ok(updates) => {
            for update in updates {
                // Advance past this update id so it is never reprocessed
                offset.store(update.id.0 as i64 + 1, Ordering::SeqCst);
                dispatch(bot, state, update).await;
            }
        }
        Err(e) => {
            logger::debug(
                LogTag::Telegram,
                &format!("Poll error (will retry): {}", e),
            );
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}

async fn dispatch(bot: &Bot, state: &AppState, update: Update) {
    let result = match update.kind {
        UpdateKind::Message(message) => commands::handle_message(bot, state, &message).await,
        UpdateKind::CallbackQuery(query) => {
            commands::callbacks::handle_callback_query(bot, state, query).await
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        logger::warning(LogTag::Telegram, &format!("Update handling failed: {}", e));
    }
}
