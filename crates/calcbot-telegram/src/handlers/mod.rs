//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into a `calcbot-core` message type and
//! hands it to the calculator service. Failures are logged, never surfaced to
//! the dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use calcbot_core::domain::{ChatId, UserId};

use crate::router::AppState;

mod callback;
mod commands;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(msg, state).await;
        }
        return text::handle_text(msg, state).await;
    }

    let chat_id = ChatId(msg.chat.id.0);
    if let Err(e) = state.calculator.handle_non_text(chat_id).await {
        tracing::warn!(chat = chat_id.0, error = %e, "non-text hint failed");
    }

    Ok(())
}

fn sender(msg: &Message) -> Option<(ChatId, UserId)> {
    let user = msg.from()?;
    Some((ChatId(msg.chat.id.0), UserId(user.id.0 as i64)))
}
