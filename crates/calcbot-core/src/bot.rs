//! Calculator bot service: turns commands, key presses and free text into
//! session edits and evaluations, and renders the replies.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::{ChatId, UserId},
    errors::ErrorKind,
    evaluator::evaluate,
    formatting::{escape_html, truncate_text},
    keypad::{calculator_keyboard, home_keyboard, KeyAction},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, TextMessage},
    },
    session::{lock, CalculatorSession, SessionStore},
    validator::validate,
    Result,
};

/// Telegram caps callback toasts at 200 characters.
const TOAST_MAX_LEN: usize = 200;

/// Outcome of pressing `=` or sending an expression as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calculation {
    pub expression: String,
    pub result: std::result::Result<String, ErrorKind>,
}

pub struct CalculatorBot {
    cfg: Arc<Config>,
    sessions: SessionStore,
    messenger: Arc<dyn MessagingPort>,
}

impl CalculatorBot {
    pub fn new(cfg: Arc<Config>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            cfg,
            sessions: SessionStore::new(),
            messenger,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn handle_command(&self, cmd: Command) -> Result<()> {
        tracing::info!(user = cmd.user_id.0, command = %cmd.name, "command");

        match cmd.name.as_str() {
            "start" => {
                self.sessions.delete(cmd.user_id);
                self.messenger
                    .send_inline_keyboard(cmd.chat_id, &self.cfg.welcome_message, home_keyboard())
                    .await?;
            }
            "calc" if !cmd.args.is_empty() => {
                self.reply_to_expression(cmd.chat_id, cmd.user_id, &cmd.args)
                    .await?;
            }
            "calc" => {
                let html = self.calculator_screen(cmd.user_id, None);
                self.messenger
                    .send_inline_keyboard(cmd.chat_id, &html, calculator_keyboard())
                    .await?;
            }
            "help" => {
                self.messenger
                    .send_inline_keyboard(cmd.chat_id, &self.cfg.help_message, home_keyboard())
                    .await?;
            }
            "clear" => {
                self.sessions.delete(cmd.user_id);
                let html =
                    self.calculator_screen(cmd.user_id, Some(&self.cfg.cleared_message));
                self.messenger
                    .send_inline_keyboard(cmd.chat_id, &html, calculator_keyboard())
                    .await?;
            }
            _ => {
                self.messenger
                    .send_html(cmd.chat_id, &self.cfg.unknown_command_message)
                    .await?;
            }
        }
        Ok(())
    }

    /// Free text is an expression typed directly.
    pub async fn handle_text(&self, msg: TextMessage) -> Result<()> {
        let text = msg.text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.reply_to_expression(msg.chat_id, msg.user_id, text)
            .await
    }

    /// Updates without text get a short hint.
    pub async fn handle_non_text(&self, chat_id: ChatId) -> Result<()> {
        self.messenger
            .send_html(chat_id, &self.cfg.non_text_message)
            .await?;
        Ok(())
    }

    pub async fn handle_callback(&self, q: CallbackQuery) -> Result<()> {
        let action = KeyAction::parse(&q.data);
        tracing::debug!(user = q.user_id.0, data = %q.data, ?action, "key press");

        let (html, keyboard, toast) = match &action {
            KeyAction::Unknown(data) => {
                tracing::debug!(data = %data, "ignoring unknown callback data");
                self.messenger
                    .answer_callback_query(&q.callback_id, None)
                    .await?;
                return Ok(());
            }
            KeyAction::Home => (
                self.cfg.welcome_message.clone(),
                home_keyboard(),
                None,
            ),
            KeyAction::Help => (self.cfg.help_message.clone(), home_keyboard(), None),
            KeyAction::OpenCalculator => (
                self.calculator_screen(q.user_id, None),
                calculator_keyboard(),
                None,
            ),
            KeyAction::Calculate => {
                let calc = self.calculate(q.user_id);
                let toast = calc
                    .result
                    .as_ref()
                    .err()
                    .map(|kind| truncate_text(self.cfg.error_message(*kind), TOAST_MAX_LEN));
                let note = self.describe(&calc);
                (
                    self.calculator_screen(q.user_id, Some(&note)),
                    calculator_keyboard(),
                    toast,
                )
            }
            edit => {
                if !self.apply_edit(q.user_id, edit) {
                    // Nothing changed on screen; Telegram rejects identical edits.
                    self.messenger
                        .answer_callback_query(&q.callback_id, None)
                        .await?;
                    return Ok(());
                }
                (
                    self.calculator_screen(q.user_id, None),
                    calculator_keyboard(),
                    None,
                )
            }
        };

        self.messenger
            .answer_callback_query(&q.callback_id, toast.as_deref())
            .await?;

        let Some(msg) = q.message else {
            return Ok(());
        };
        self.messenger
            .edit_inline_keyboard(msg, &html, keyboard)
            .await
    }

    /// Validate and evaluate the user's current expression.
    ///
    /// On success the result replaces the expression.
    pub fn calculate(&self, user_id: UserId) -> Calculation {
        let handle = self.sessions.get_or_create(user_id);
        let mut session = lock(&handle);
        let expression = session.expression().to_string();
        let result = self.evaluate_checked(&expression);
        if let Ok(value) = &result {
            session.set_result(value);
        }
        Calculation { expression, result }
    }

    fn evaluate_checked(&self, expression: &str) -> std::result::Result<String, ErrorKind> {
        validate(expression, self.cfg.max_expression_length)?;
        evaluate(expression)
    }

    async fn reply_to_expression(&self, chat_id: ChatId, user_id: UserId, text: &str) -> Result<()> {
        let calc = Calculation {
            expression: text.to_string(),
            result: self.evaluate_checked(text),
        };

        match &calc.result {
            Ok(value) => {
                {
                    let handle = self.sessions.get_or_create(user_id);
                    lock(&handle).set_result(value);
                }
                let note = self.describe(&calc);
                let html = self.calculator_screen(user_id, Some(&note));
                self.messenger
                    .send_inline_keyboard(chat_id, &html, calculator_keyboard())
                    .await?;
            }
            Err(kind) => {
                self.messenger
                    .send_html(chat_id, &escape_html(self.cfg.error_message(*kind)))
                    .await?;
            }
        }
        Ok(())
    }

    /// Apply a keypad edit; returns whether the expression changed.
    fn apply_edit(&self, user_id: UserId, action: &KeyAction) -> bool {
        let handle = self.sessions.get_or_create(user_id);
        let mut session = lock(&handle);
        let before = session.clone();
        apply_key(&mut session, action);
        *session != before
    }

    fn describe(&self, calc: &Calculation) -> String {
        match &calc.result {
            Ok(value) => format!(
                "<i>{} = {}</i>",
                escape_html(&calc.expression),
                escape_html(value)
            ),
            Err(kind) => escape_html(self.cfg.error_message(*kind)),
        }
    }

    fn calculator_screen(&self, user_id: UserId, note: Option<&str>) -> String {
        let handle = self.sessions.get_or_create(user_id);
        let display = lock(&handle).display();
        render_calculator(&display, note)
    }
}

fn apply_key(session: &mut CalculatorSession, action: &KeyAction) {
    match action {
        KeyAction::Input(token) => session.append(token),
        KeyAction::Operator(name) => session.append_operator(name),
        KeyAction::Function(name) => session.append_function(name),
        KeyAction::Constant(name) => session.append_constant(name),
        KeyAction::ClearEntry | KeyAction::Backspace => session.delete_last(),
        KeyAction::ClearAll => session.reset_all(),
        KeyAction::Calculate
        | KeyAction::Home
        | KeyAction::Help
        | KeyAction::OpenCalculator
        | KeyAction::Unknown(_) => {}
    }
}

fn render_calculator(display: &str, note: Option<&str>) -> String {
    let mut html = format!("🧮 <b>Calculator</b>\n\n{display}");
    if let Some(note) = note {
        html.push_str("\n\n");
        html.push_str(note);
    }
    html
}
