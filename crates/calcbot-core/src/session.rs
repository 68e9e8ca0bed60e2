use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{domain::UserId, formatting::escape_html};

/// Display value of an empty calculator.
pub const PLACEHOLDER: &str = "0";

/// Tokens that extend the placeholder instead of replacing it (`"0"` + `"+"` = `"0+"`).
const EXTENDING_TOKENS: [&str; 6] = ["+", "-", "*", "/", "(", ")"];

const OPERATORS: [(&str, &str); 6] = [
    ("add", "+"),
    ("sub", "-"),
    ("mul", "×"),
    ("div", "÷"),
    ("mod", "%"),
    ("pow", "^"),
];

/// One user's in-progress expression.
///
/// The expression is never empty; the smallest value is [`PLACEHOLDER`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalculatorSession {
    user_id: UserId,
    expression: String,
    last_result: Option<String>,
}

impl CalculatorSession {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            expression: PLACEHOLDER.to_string(),
            last_result: None,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    pub fn append(&mut self, token: &str) {
        if self.expression == PLACEHOLDER && !EXTENDING_TOKENS.contains(&token) {
            self.expression = token.to_string();
        } else {
            self.expression.push_str(token);
        }
    }

    /// Drop the last character (`C` and `⌫` share this behavior).
    pub fn delete_last(&mut self) {
        let mut chars = self.expression.chars();
        if chars.next_back().is_some() && !chars.as_str().is_empty() {
            let keep = chars.as_str().len();
            self.expression.truncate(keep);
        } else {
            self.expression = PLACEHOLDER.to_string();
        }
    }

    pub fn reset_all(&mut self) {
        self.expression = PLACEHOLDER.to_string();
        self.last_result = None;
    }

    pub fn set_result(&mut self, value: &str) {
        self.expression = value.to_string();
        self.last_result = Some(value.to_string());
    }

    /// Expression in monospace, ready for Telegram HTML.
    pub fn display(&self) -> String {
        format!("<code>{}</code>", escape_html(&self.expression))
    }

    /// Scientific function button: `sin` -> `sin(`, `fact` -> postfix `!`.
    pub fn append_function(&mut self, name: &str) {
        match name {
            "sin" | "cos" | "tan" | "log" | "ln" | "sqrt" | "abs" => {
                self.append(&format!("{name}("))
            }
            "fact" | "factorial" => self.append("!"),
            _ => {}
        }
    }

    pub fn append_constant(&mut self, name: &str) {
        match name {
            "pi" => self.append("pi"),
            "e" => self.append("e"),
            _ => {}
        }
    }

    /// Operator button by semantic name; unknown names are ignored.
    pub fn append_operator(&mut self, name: &str) {
        if let Some((_, glyph)) = OPERATORS.iter().find(|(op, _)| *op == name) {
            self.append(glyph);
        }
    }
}

pub type SessionHandle = Arc<Mutex<CalculatorSession>>;

/// Volatile per-process map of user sessions.
///
/// Lookup and insertion happen under one lock, so concurrent first touches of the
/// same user observe the same session.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<UserId, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, user_id: UserId) -> SessionHandle {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(CalculatorSession::new(user_id))))
            .clone()
    }

    /// Remove the session; the next touch starts from the placeholder.
    pub fn delete(&self, user_id: UserId) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(&user_id);
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock a session handle; a poisoned lock still holds a valid session.
pub fn lock(handle: &SessionHandle) -> MutexGuard<'_, CalculatorSession> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    fn session() -> CalculatorSession {
        CalculatorSession::new(UserId(1))
    }

    #[test]
    fn new_session_shows_placeholder() {
        let s = session();
        assert_eq!(s.expression(), "0");
        assert_eq!(s.last_result(), None);
    }

    #[test]
    fn append_builds_expression_and_backspace_trims() {
        let mut s = session();
        s.append("5");
        s.append("+");
        s.append("3");
        assert_eq!(s.expression(), "5+3");

        s.delete_last();
        assert_eq!(s.expression(), "5+");
        s.delete_last();
        assert_eq!(s.expression(), "5");
        s.delete_last();
        assert_eq!(s.expression(), "0");
        s.delete_last();
        assert_eq!(s.expression(), "0");
    }

    #[test]
    fn placeholder_is_replaced_by_digits_but_extended_by_operators() {
        let mut s = session();
        s.append("+");
        assert_eq!(s.expression(), "0+");

        let mut s = session();
        s.append("7");
        assert_eq!(s.expression(), "7");

        let mut s = session();
        s.append("(");
        assert_eq!(s.expression(), "0(");
    }

    #[test]
    fn display_glyphs_are_not_in_the_extending_set() {
        // The keypad appends `×`; only ASCII operators extend the placeholder.
        let mut s = session();
        s.append_operator("mul");
        assert_eq!(s.expression(), "×");
    }

    #[test]
    fn delete_last_handles_multibyte_glyphs() {
        let mut s = session();
        s.append("6");
        s.append_operator("div");
        assert_eq!(s.expression(), "6÷");
        s.delete_last();
        assert_eq!(s.expression(), "6");
    }

    #[test]
    fn reset_all_clears_result() {
        let mut s = session();
        s.set_result("42");
        assert_eq!(s.expression(), "42");
        assert_eq!(s.last_result(), Some("42"));

        s.reset_all();
        assert_eq!(s.expression(), "0");
        assert_eq!(s.last_result(), None);
    }

    #[test]
    fn result_continues_unless_it_is_zero() {
        let mut s = session();
        s.set_result("12");
        s.append("3");
        assert_eq!(s.expression(), "123");

        s.set_result("0");
        s.append("3");
        assert_eq!(s.expression(), "3");
    }

    #[test]
    fn function_constant_and_operator_mappers() {
        let mut s = session();
        s.append_function("sin");
        assert_eq!(s.expression(), "sin(");

        let mut s = session();
        s.append("5");
        s.append_function("fact");
        assert_eq!(s.expression(), "5!");

        let mut s = session();
        s.append("2");
        s.append_constant("pi");
        s.append_constant("e");
        s.append_constant("tau");
        assert_eq!(s.expression(), "2pie");

        let mut s = session();
        s.append("2");
        for op in ["add", "sub", "mul", "div", "mod", "pow", "xor"] {
            s.append_operator(op);
        }
        assert_eq!(s.expression(), "2+-×÷%^");
    }

    #[test]
    fn unknown_function_is_ignored() {
        let mut s = session();
        s.append_function("exp");
        assert_eq!(s.expression(), "0");
    }

    #[test]
    fn display_wraps_in_code_and_escapes() {
        let mut s = session();
        s.append("1<2");
        assert_eq!(s.display(), "<code>1&lt;2</code>");
    }

    #[test]
    fn store_reuses_and_deletes_sessions() {
        let store = SessionStore::new();
        let a = store.get_or_create(UserId(7));
        lock(&a).append("9");

        let b = store.get_or_create(UserId(7));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(lock(&b).expression(), "9");
        assert_eq!(store.len(), 1);

        store.delete(UserId(7));
        assert!(store.is_empty());
        let c = store.get_or_create(UserId(7));
        assert_eq!(lock(&c).expression(), "0");
    }

    #[test]
    fn concurrent_first_touch_creates_one_session() {
        const THREADS: usize = 16;
        let store = Arc::new(SessionStore::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    store.get_or_create(UserId(99))
                })
            })
            .collect();

        let sessions: Vec<SessionHandle> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first = &sessions[0];
        assert!(sessions.iter().all(|s| Arc::ptr_eq(first, s)));
        assert_eq!(store.len(), 1);
    }
}
