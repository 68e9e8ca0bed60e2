//! Core of the calculator bot: per-user expression sessions, the safe
//! evaluator, and the bot service that ties them to a messenger.
//!
//! Telegram specifics live in `calcbot-telegram` behind [`messaging::port::MessagingPort`].

pub mod bot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod evaluator;
pub mod formatting;
pub mod keypad;
pub mod logging;
pub mod messaging;
pub mod session;
pub mod validator;

pub use errors::{Error, ErrorKind, Result};
