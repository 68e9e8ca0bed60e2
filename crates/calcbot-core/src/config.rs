use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::{Error, ErrorKind},
    Result,
};

pub const DEFAULT_MAX_EXPRESSION_LENGTH: usize = 100;

/// Typed configuration for the calculator bot.
///
/// Message texts are Telegram HTML.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub max_expression_length: usize,
    pub error_messages: ErrorMessages,
    pub welcome_message: String,
    pub help_message: String,
    pub cleared_message: String,
    pub unknown_command_message: String,
    /// Reply to stickers, photos and other updates without text.
    pub non_text_message: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| env_str("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("No BOT_TOKEN found in environment variables!".to_string())
            })?;

        let max_expression_length =
            parse_max_expression_length(env_str("MAX_EXPRESSION_LENGTH"))?;

        let mut cfg = Self::new(bot_token, max_expression_length);
        if let Some(path) = env_path("ERROR_MESSAGES_FILE") {
            let overrides = load_message_overrides(&path)?;
            cfg.error_messages.merge(overrides);
        }

        Ok(cfg)
    }

    /// Configuration with the built-in message texts.
    pub fn new(bot_token: impl Into<String>, max_expression_length: usize) -> Self {
        Self {
            bot_token: bot_token.into(),
            max_expression_length,
            error_messages: ErrorMessages::defaults(max_expression_length),
            welcome_message: WELCOME_MESSAGE.to_string(),
            help_message: HELP_MESSAGE.to_string(),
            cleared_message: CLEARED_MESSAGE.to_string(),
            unknown_command_message: UNKNOWN_COMMAND_MESSAGE.to_string(),
            non_text_message: NON_TEXT_MESSAGE.to_string(),
        }
    }

    pub fn error_message(&self, kind: ErrorKind) -> &str {
        self.error_messages.get(kind)
    }
}

/// User-facing text for each `ErrorKind`.
#[derive(Clone, Debug)]
pub struct ErrorMessages {
    by_kind: HashMap<ErrorKind, String>,
}

impl ErrorMessages {
    pub fn defaults(max_expression_length: usize) -> Self {
        let by_kind = ErrorKind::ALL
            .into_iter()
            .map(|kind| {
                let text = match kind {
                    ErrorKind::DivisionByZero => "❌ Error: Division by zero!".to_string(),
                    ErrorKind::InvalidSyntax => "❌ Error: Invalid expression!".to_string(),
                    ErrorKind::MathDomain => "❌ Error: Math domain error!".to_string(),
                    ErrorKind::TooLong => format!(
                        "❌ Error: Expression too long! Max {max_expression_length} characters"
                    ),
                    ErrorKind::CalculationError => "❌ Error: Could not calculate!".to_string(),
                };
                (kind, text)
            })
            .collect();
        Self { by_kind }
    }

    pub fn get(&self, kind: ErrorKind) -> &str {
        self.by_kind.get(&kind).map(String::as_str).unwrap_or("❌ Error")
    }

    /// Replace the texts present in `overrides`; other kinds keep their current text.
    pub fn merge(&mut self, overrides: HashMap<ErrorKind, String>) {
        for (kind, text) in overrides {
            if !text.trim().is_empty() {
                self.by_kind.insert(kind, text);
            }
        }
    }
}

fn parse_max_expression_length(raw: Option<String>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_EXPRESSION_LENGTH);
    };
    let n = raw.trim().parse::<usize>().map_err(|_| {
        Error::Config(format!("MAX_EXPRESSION_LENGTH must be a number, got {raw:?}"))
    })?;
    if n == 0 {
        return Err(Error::Config(
            "MAX_EXPRESSION_LENGTH must be greater than zero".to_string(),
        ));
    }
    Ok(n)
}

fn load_message_overrides(path: &Path) -> Result<HashMap<ErrorKind, String>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read ERROR_MESSAGES_FILE {}: {e}", path.display()))
    })?;
    let parsed: HashMap<ErrorKind, String> = serde_json::from_str(&raw)?;
    Ok(parsed)
}

const WELCOME_MESSAGE: &str = "🧮 <b>Welcome to Calculator Bot!</b>

I'm your personal calculator bot. You can perform basic and scientific calculations right here in Telegram!

<b>Commands:</b>
/calc - Open calculator
/help - Show instructions
/clear - Reset current expression

<b>Features:</b>
• Basic operations: +, -, ×, ÷, %, ^
• Scientific functions: sin, cos, tan, log, ln, √, !
• Constants: π (pi), e
• Parentheses support
• Error handling

Press /calc to start calculating!";

const HELP_MESSAGE: &str = "📚 <b>Calculator Bot Help</b>

<b>Basic Operations:</b>
• Addition: 5 + 3
• Subtraction: 10 - 4
• Multiplication: 6 × 3
• Division: 15 ÷ 3
• Percent: 50% (equals 0.5)
• Power: 2 ^ 3 (equals 8)

<b>Scientific Functions:</b>
• sin(x), cos(x), tan(x) - x in radians
• log(100) - base 10 logarithm
• ln(10) - natural logarithm
• sqrt(25) - square root
• 5! - factorial

<b>Constants:</b>
• pi = 3.14159...
• e = 2.71828...

<b>Button Functions:</b>
• C - Clear last entry
• AC - Clear all (reset)
• ⌫ - Backspace
• = - Calculate result

<b>Tips:</b>
• You can type expressions directly
• Use parentheses: (5+3)*2
• The bot remembers your expression
• Use /clear to reset if needed

<b>Examples:</b>
• 2+2 = 4
• 5! = 120
• sqrt(25) = 5
• 2^3 = 8
• pi*2 = 6.2831853072";

const CLEARED_MESSAGE: &str = "🧹 Expression cleared.";

const UNKNOWN_COMMAND_MESSAGE: &str = "Unknown command. Use /help to see what I can do.";

const NON_TEXT_MESSAGE: &str =
    "Send me an expression like 2+2, or use /calc to open the keypad.";

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_str(key).and_then(non_empty).map(PathBuf::from)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_long_default_mentions_limit() {
        let cfg = Config::new("token", 42);
        assert!(cfg.error_message(ErrorKind::TooLong).contains("Max 42"));
    }

    #[test]
    fn every_kind_has_a_default_message() {
        let msgs = ErrorMessages::defaults(100);
        for kind in ErrorKind::ALL {
            assert!(msgs.get(kind).starts_with("❌"));
        }
    }

    #[test]
    fn overrides_replace_only_listed_kinds() {
        let mut msgs = ErrorMessages::defaults(100);
        let overrides: HashMap<ErrorKind, String> =
            serde_json::from_str(r#"{"division_by_zero": "nope", "math_domain": "  "}"#)
                .unwrap();
        msgs.merge(overrides);

        assert_eq!(msgs.get(ErrorKind::DivisionByZero), "nope");
        assert_eq!(msgs.get(ErrorKind::MathDomain), "❌ Error: Math domain error!");
        assert_eq!(msgs.get(ErrorKind::InvalidSyntax), "❌ Error: Invalid expression!");
    }

    #[test]
    fn unknown_override_keys_are_rejected() {
        let parsed = serde_json::from_str::<HashMap<ErrorKind, String>>(r#"{"boom": "x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn max_expression_length_parsing() {
        assert_eq!(parse_max_expression_length(None).unwrap(), 100);
        assert_eq!(parse_max_expression_length(Some(" 250 ".into())).unwrap(), 250);
        assert!(matches!(
            parse_max_expression_length(Some("lots".into())),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_max_expression_length(Some("0".into())),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn message_overrides_load_from_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("messages.json");
        fs::write(&path, r#"{"too_long": "too much", "invalid_syntax": "huh?"}"#).unwrap();

        let overrides = load_message_overrides(&path).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[&ErrorKind::InvalidSyntax], "huh?");

        let mut msgs = ErrorMessages::defaults(100);
        msgs.merge(overrides);
        assert_eq!(msgs.get(ErrorKind::TooLong), "too much");
        assert_eq!(msgs.get(ErrorKind::DivisionByZero), "❌ Error: Division by zero!");
    }

    #[test]
    fn bad_message_files_are_config_or_json_errors() {
        let tmp = tempfile::tempdir().expect("tempdir");

        let missing = tmp.path().join("absent.json");
        assert!(matches!(
            load_message_overrides(&missing),
            Err(Error::Config(_))
        ));

        let broken = tmp.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        assert!(matches!(
            load_message_overrides(&broken),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn unquote_strips_matching_quotes() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("\"abc'"), "\"abc'");
        assert_eq!(unquote("x"), "x");
    }
}
