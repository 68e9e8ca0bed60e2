use std::sync::Arc;

use teloxide::prelude::*;

use calcbot_core::messaging::types::Command;

use crate::router::AppState;

use super::sender;

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some((chat_id, user_id)) = sender(&msg) else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let cmd = Command::parse(chat_id, user_id, text);
    let name = cmd.name.clone();
    if let Err(e) = state.calculator.handle_command(cmd).await {
        tracing::warn!(user = user_id.0, command = %name, error = %e, "command failed");
    }

    Ok(())
}
