//! Message dispatch for incoming Telegram updates
//!
//! Routes `/start` and free-text input; button presses are handled by
//! [`callbacks`]. Free text is only meaningful while an add-host session is
//! active for the chat.

pub mod callbacks;
pub mod hosts;
pub mod onboarding;

use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, Message, MessageId, ParseMode};

use crate::logger::{self, LogTag};
use crate::telegram::polling::AppState;
use crate::telegram::session::get_session_manager;
use crate::telegram::keyboards;

pub(crate) const WELCOME_MESSAGE: &str = "👋 Hi! I am a <i>host monitoring</i> bot!\n\
    👾 I watch the state of your machines: <b>memory, temperatures and more</b>.\n\
    🖥️ I can <b>keep an eye on</b> several hosts at once.\n\
    🚀 <i>Ready to keep things under control</i>!";

/// Handle one incoming chat message
pub async fn handle_message(
    bot: &Bot,
    state: &AppState,
    message: &Message,
) -> Result<(), String> {
    let text = match message.text() {
        Some(text) => text.to_string(),
        None => return Ok(()),
    };

    if text == "/start" || text.starts_with("/start ") {
        return handle_start(bot, state, message).await;
    }

    let chat_id = message.chat.id;
    if get_session_manager().get(chat_id.0).await.is_some() {
        return onboarding::handle_session_input(bot, state, message, &text).await;
    }

    logger::debug(
        LogTag::Telegram,
        &format!("Ignoring text outside any flow in chat {}", chat_id.0),
    );
    Ok(())
}

/// Handle /start: lazily register the user and show the main menu.
/// The owning identity is the chat id, which doubles as the user id in the
/// private chats this bot is made for.
async fn handle_start(bot: &Bot, state: &AppState, message: &Message) -> Result<(), String> {
    let user_id = message.chat.id.0;

    logger::info(LogTag::Telegram, &format!("User {} started the bot", user_id));
    state
        .db
        .ensure_user(user_id)
        .map_err(|e| format!("Failed to register user: {}", e))?;

    bot.send_message(message.chat.id, WELCOME_MESSAGE)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await
        .map_err(|e| format!("Failed to send welcome: {}", e))?;
    Ok(())
}

/// Edit the given message in place, or send a new one when there is nothing
/// to edit (the inline-keyboard navigation style: one message is the screen).
pub(crate) async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    text: &str,
    keyboard: InlineKeyboardMarkup,
) -> Result<(), String> {
    match message_id {
        Some(id) => bot
            .edit_message_text(chat_id, id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to edit message: {}", e)),
        None => bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to send message: {}", e)),
    }
}
