//! Messenger abstraction; Telegram implements it in `calcbot-telegram`.

pub mod port;
pub mod types;
