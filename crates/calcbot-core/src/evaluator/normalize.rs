//! Calculator notation -> parser notation.

use std::sync::OnceLock;

use regex::Regex;

fn factorial_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)!").expect("valid regex"))
}

/// Rewrite display glyphs and postfix forms.
///
/// Order matters: `^` becomes `**` before anything else looks at operators, and
/// `%` is replaced everywhere (it is a percent sign, not modulo).
pub fn normalize(expression: &str) -> String {
    let s = expression
        .replace('×', "*")
        .replace('÷', "/")
        .replace('^', "**");
    let s = factorial_re().replace_all(&s, "factorial($1)");
    s.replace('%', "/100")
}
