use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::Notify;

use hostwatch::arguments;
use hostwatch::config::Config;
use hostwatch::database::Database;
use hostwatch::logger::{self, LogTag};
use hostwatch::probe::ProbeClient;
use hostwatch::telegram::polling::{run_polling, AppState};

/// Main entry point for hostwatch
///
/// Startup order matters: arguments first (the logger reads debug flags),
/// then config, then the registry, then the polling loop.
#[tokio::main]
async fn main() -> Result<()> {
    if arguments::is_help_requested() {
        arguments::print_help();
        return Ok(());
    }

    logger::info(LogTag::System, "🚀 hostwatch starting up...");

    let config_path = arguments::config_path();
    let config = Config::load(&config_path)
        .with_context(|| format!("Could not load configuration from {}", config_path))?;

    let db = Database::open(Path::new(&config.database.path))
        .context("Could not open the registry database")?;

    let probe = ProbeClient::new(config.probe.timeout_seconds, &config.probe.endpoint)
        .context("Could not build the metrics probe")?;

    let bot = Bot::new(&config.telegram.bot_token);
    let me = bot
        .get_me()
        .await
        .context("Could not validate the bot token")?;
    logger::info(
        LogTag::System,
        &format!(
            "Bot connected: @{} (ID: {})",
            me.username.as_deref().unwrap_or("unknown"),
            me.id
        ),
    );

    let shutdown = Arc::new(Notify::new());
    let shutdown_signal = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_signal.notify_waiters();
    })
    .context("Could not install the Ctrl-C handler")?;

    let state = Arc::new(AppState { db, probe });
    run_polling(bot, state, shutdown).await;

    logger::info(LogTag::System, "Shutdown complete");
    Ok(())
}
