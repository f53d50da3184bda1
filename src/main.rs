use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront::ai::AiCapability;
use storefront::bot::{schema, Command, Router};
use storefront::config::{LogFormat, Settings};
use storefront::db::CatalogStore;
use storefront::dialogue::DialogController;
use storefront::localization::init_localization;
use storefront::session::SessionStore;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(settings) => {
            init_tracing(settings.log_format);
            settings
        }
        Err(e) => {
            init_tracing(LogFormat::Text);
            error!(error = %e, "Configuration error, the bot cannot start");
            std::process::exit(1);
        }
    };

    info!("Starting Storefront Telegram Bot");

    if let Err(e) = init_localization() {
        warn!(error = %e, "Localization failed to initialize");
    }

    if let Some(admin_id) = settings.admin_telegram_id {
        info!(admin_id = admin_id, "Administrator id configured");
    }

    // Catalog problems are not fatal: an unreachable store reads as an empty catalog
    let catalog = CatalogStore::connect_lazy(&settings.database_url)
        .with_context(|| format!("Invalid DATABASE_URL: {}", settings.database_url))?;
    match catalog.init_schema().await {
        Ok(()) => match catalog.seed_if_empty().await {
            Ok(0) => info!("Catalog already contains products"),
            Ok(inserted) => info!(inserted = inserted, "Catalog seeded with sample products"),
            Err(e) => error!(error = %e, "Failed to seed catalog"),
        },
        Err(e) => error!(error = %e, "Failed to initialize catalog schema"),
    }

    let ai = AiCapability::from_settings(settings.ai.as_ref());
    let router = Arc::new(Router::new(
        catalog,
        DialogController::new(ai),
        SessionStore::new(),
    ));

    let bot = Bot::new(settings.telegram_token.clone());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!("Bot initialized, waiting for messages...");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
