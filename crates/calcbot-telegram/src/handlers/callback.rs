use std::sync::Arc;

use teloxide::prelude::*;

use calcbot_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::CallbackQuery as KeyPress,
};

use crate::router::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(data) = q.data.clone().filter(|d| !d.is_empty()) else {
        // Always answer callback query eventually.
        if let Err(e) = bot.answer_callback_query(q.id).await {
            tracing::warn!(error = %e, "answering empty callback failed");
        }
        return Ok(());
    };

    let user_id = UserId(q.from.id.0 as i64);
    let press = KeyPress {
        user_id,
        callback_id: q.id.clone(),
        data,
        message: q.message.as_ref().map(|m| MessageRef {
            chat_id: ChatId(m.chat.id.0),
            message_id: MessageId(m.id.0),
        }),
    };

    if let Err(e) = state.calculator.handle_callback(press).await {
        tracing::warn!(user = user_id.0, error = %e, "key press handling failed");
    }

    Ok(())
}
