use std::sync::Arc;

use teloxide::prelude::*;

use calcbot_core::messaging::types::TextMessage;

use crate::router::AppState;

use super::sender;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some((chat_id, user_id)) = sender(&msg) else {
        return Ok(());
    };
    let Some(text) = msg.text().map(|s| s.to_string()) else {
        return Ok(());
    };

    let incoming = TextMessage {
        chat_id,
        user_id,
        text,
    };
    if let Err(e) = state.calculator.handle_text(incoming).await {
        tracing::warn!(user = user_id.0, error = %e, "text expression reply failed");
    }

    Ok(())
}
