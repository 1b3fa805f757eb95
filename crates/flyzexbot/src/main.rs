use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use secrecy::ExposeSecret;
use teloxide::prelude::*;

use flyzex_core::{Settings, Storage};
use flyzexbot::cli::{Cli, Commands};
use flyzexbot::logging::init_logger;
use flyzexbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use flyzexbot::webapp::run_webapp_server;

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (settings, logging, storage,
/// bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Set up a global panic handler so a panicking handler gets logged
    // instead of killing the process silently.
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Run { config }) => run_bot(&config).await,
        Some(Commands::CheckConfig { config }) => check_config(&config),
        None => run_bot(Path::new("config/settings.yaml")).await,
    }
}

/// Validates the settings file and prints a short summary.
fn check_config(config_path: &Path) -> Result<()> {
    let settings = Settings::load(config_path)?;
    init_logger(&settings.logging)?;

    log::info!("Settings file {} is valid", config_path.display());
    log::info!("  owner: {}", settings.telegram.owner_id);
    log::info!(
        "  review chat: {}",
        settings
            .telegram
            .application_review_chat
            .map(|id| id.to_string())
            .unwrap_or_else(|| "admins directly".to_string())
    );
    log::info!("  intake questions: {}", settings.intake.questions.len());
    log::info!("  storage: {}", settings.storage.path.display());
    log::info!(
        "  dashboard: {}:{} (static: {})",
        settings.webapp.host,
        settings.webapp.port,
        settings.webapp.static_dir.display()
    );
    Ok(())
}

async fn run_bot(config_path: &Path) -> Result<()> {
    let settings = Arc::new(Settings::load(config_path)?);
    init_logger(&settings.logging)?;
    log::info!("Starting FlyzexBot (config: {})", config_path.display());

    // Open the guild document before anything talks to Telegram
    let storage = Arc::new(Storage::open(&settings.storage.path).await?);

    let token = settings.bot_token()?;
    let bot = create_bot(token.expose_secret());

    let me = bot.get_me().await?;
    log::info!("Bot username: {:?}, id: {}", me.username, me.id);

    setup_bot_commands(&bot).await?;

    let deps = HandlerDeps::new(Arc::clone(&storage), Arc::clone(&settings));

    // The dashboard server shares the store and runs next to the dispatcher
    // on the same runtime.
    let webapp_storage = Arc::clone(&storage);
    let webapp_settings = Arc::clone(&settings);
    tokio::spawn(async move {
        if let Err(err) = run_webapp_server(webapp_storage, webapp_settings).await {
            log::error!("Dashboard server exited: {err}");
        }
    });

    log::info!("📡 Ready to receive updates");
    Dispatcher::builder(bot, schema(deps))
        .dependencies(dptree::deps![])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
