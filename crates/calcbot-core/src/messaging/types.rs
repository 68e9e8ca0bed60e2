use crate::domain::{ChatId, MessageRef, UserId};

/// Slash command addressed to the bot (`/calc@MyBot` -> `calc`).
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub name: String,
    pub args: String,
}

impl Command {
    pub fn parse(chat_id: ChatId, user_id: UserId, text: &str) -> Self {
        let mut parts = text.trim().splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("").trim();
        let args = parts.next().unwrap_or("").trim().to_string();

        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();

        Self {
            chat_id,
            user_id,
            name,
            args,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub text: String,
}

/// Inline keyboard button press.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub user_id: UserId,
    pub callback_id: String,
    pub data: String,
    /// Message carrying the keyboard; absent for very old messages.
    pub message: Option<MessageRef>,
}

/// Inline keyboard laid out in rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_strips_bot_suffix_and_args() {
        let c = Command::parse(ChatId(1), UserId(2), "/Calc@CalculatorBot  2+2 ");
        assert_eq!(c.name, "calc");
        assert_eq!(c.args, "2+2");
    }

    #[test]
    fn bare_command() {
        let c = Command::parse(ChatId(1), UserId(2), "/help");
        assert_eq!(c.name, "help");
        assert!(c.args.is_empty());
    }
}
