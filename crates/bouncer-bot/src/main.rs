//! Discord command bot.
//!
//! Listens for chat commands (`!ping`, `!roll`, `!kick`, `!block`) and
//! answers them through an action queue that absorbs Discord rate limits.

mod config;
mod directory;
mod errors;
mod handlers;
mod health;
mod platform;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bouncer_dispatch::Dispatcher;
use bouncer_queue::ActionQueue;

use crate::config::Config;
use crate::directory::SerenityDirectory;
use crate::handlers::{DispatcherKey, Handler};
use crate::health::AppState;
use crate::platform::SerenityPlatform;

/// Bouncer bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/bouncer.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bouncer_bot=debug,bouncer_dispatch=debug,bouncer_queue=debug,info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bouncer bot");

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        let mut config = Config::from_file(&args.config)?;

        if let Some(bot_token) = args.bot_token {
            config.discord.bot_token = bot_token;
        }

        config
    } else {
        info!("Config file not found, loading from environment");
        let mut config = Config::from_env()?;

        if let Some(bot_token) = args.bot_token {
            config.discord.bot_token = bot_token;
        }

        config
    };

    // Build serenity client
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    // The directory needs the bot's own id for permission and hierarchy
    // checks; resolve it once up front.
    let bot_user = client
        .http
        .get_current_user()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to look up the bot user: {}", e))?;
    info!("Authenticated as user id {}", bot_user.id.get());

    // Wire the queue and dispatcher against the client's own HTTP handle
    let queue = ActionQueue::new(SerenityPlatform::new(client.http.clone()));
    let directory = SerenityDirectory::new(client.http.clone(), bot_user.id.get());
    let dispatcher = Arc::new(Dispatcher::new(queue.clone(), directory));

    // Set up health check state before inserting into client data
    let health_state = AppState::new(queue.subscribe_in_flight());

    // Insert dispatcher and health state into client data
    {
        let mut data = client.data.write().await;
        data.insert::<DispatcherKey>(dispatcher);
        data.insert::<AppState>(health_state.clone());
    }

    // Start health check server
    let health_port = args.health_port;
    let health_state_clone = health_state.clone();
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state_clone, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    // Start the Discord client (blocks until all shards are stopped)
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    // Let in-flight actions settle before exiting.
    if tokio::time::timeout(Duration::from_secs(10), queue.drain())
        .await
        .is_err()
    {
        warn!("Timed out waiting for queued actions to finish");
    }

    info!("Bouncer bot stopped");
    Ok(())
}
