use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use calcbot_core::{bot::CalculatorBot, config::Config, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<CalculatorBot>,
}

/// Commands shown in the Telegram menu.
fn menu_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("calc", "Open calculator"),
        BotCommand::new("help", "Show instructions"),
        BotCommand::new("clear", "Reset current expression"),
    ]
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "calculator bot started"),
        Err(e) => tracing::warn!(error = %e, "get_me failed"),
    }
    tracing::info!(
        max_expression_length = cfg.max_expression_length,
        "sessions are kept in memory only"
    );

    if let Err(e) = bot.set_my_commands(menu_commands()).await {
        tracing::warn!(error = %e, "failed to register command menu");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        calculator: Arc::new(CalculatorBot::new(cfg, messenger)),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
