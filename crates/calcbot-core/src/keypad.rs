//! Calculator keypad: layouts and callback-data decoding.

use crate::messaging::types::{InlineButton, InlineKeyboard};

/// What a button press asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Literal text to append (`num_7` -> `7`, `num_dot` -> `.`, parentheses).
    Input(String),
    Operator(String),
    Function(String),
    Constant(String),
    ClearEntry,
    ClearAll,
    Backspace,
    Calculate,
    Home,
    Help,
    OpenCalculator,
    Unknown(String),
}

impl KeyAction {
    pub fn parse(data: &str) -> Self {
        match data {
            "num_dot" => return KeyAction::Input(".".to_string()),
            "paren_open" => return KeyAction::Input("(".to_string()),
            "paren_close" => return KeyAction::Input(")".to_string()),
            "clear_entry" => return KeyAction::ClearEntry,
            "clear_all" => return KeyAction::ClearAll,
            "backspace" => return KeyAction::Backspace,
            "calculate" => return KeyAction::Calculate,
            "home" => return KeyAction::Home,
            "help" => return KeyAction::Help,
            "open_calc" => return KeyAction::OpenCalculator,
            _ => {}
        }

        let Some((prefix, name)) = data.split_once('_') else {
            return KeyAction::Unknown(data.to_string());
        };
        match prefix {
            "num" if name.len() == 1 && name.chars().all(|c| c.is_ascii_digit()) => {
                KeyAction::Input(name.to_string())
            }
            "op" => KeyAction::Operator(name.to_string()),
            "func" => KeyAction::Function(name.to_string()),
            "const" => KeyAction::Constant(name.to_string()),
            _ => KeyAction::Unknown(data.to_string()),
        }
    }
}

fn row(buttons: &[(&str, &str)]) -> Vec<InlineButton> {
    buttons
        .iter()
        .map(|(label, data)| InlineButton::new(*label, *data))
        .collect()
}

pub fn calculator_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        row(&[
            ("sin", "func_sin"),
            ("cos", "func_cos"),
            ("tan", "func_tan"),
            ("log", "func_log"),
        ]),
        row(&[
            ("ln", "func_ln"),
            ("√", "func_sqrt"),
            ("!", "func_fact"),
            ("^", "op_pow"),
        ]),
        row(&[
            ("π", "const_pi"),
            ("e", "const_e"),
            ("(", "paren_open"),
            (")", "paren_close"),
        ]),
        row(&[("7", "num_7"), ("8", "num_8"), ("9", "num_9"), ("÷", "op_div")]),
        row(&[("4", "num_4"), ("5", "num_5"), ("6", "num_6"), ("×", "op_mul")]),
        row(&[("1", "num_1"), ("2", "num_2"), ("3", "num_3"), ("-", "op_sub")]),
        row(&[("0", "num_0"), (".", "num_dot"), ("%", "op_mod"), ("+", "op_add")]),
        row(&[
            ("C", "clear_entry"),
            ("AC", "clear_all"),
            ("⌫", "backspace"),
            ("=", "calculate"),
        ]),
        row(&[("🏠 Home", "home"), ("❓ Help", "help")]),
    ])
}

pub fn home_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![row(&[
        ("🧮 Open Calculator", "open_calc"),
        ("❓ Help", "help"),
    ])])
}
