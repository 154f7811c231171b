use anyhow::Result;
use serenity::{
    http::Http,
    model::{gateway::GatewayIntents, id::ApplicationId, id::GuildId},
    Client,
};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{error, info, warn};

mod audio;
mod bot;
mod config;
mod error;
mod keepalive;
#[cfg(test)]
mod test_support;
mod ui;
mod voice;

use crate::audio::{catalog::AudioCatalog, controller::PlaybackController};
use crate::bot::{
    commands,
    events::pump_track_events,
    router::{InteractionRouter, RouterOptions},
    CountdownBot,
};
use crate::config::Config;
use crate::voice::{session::VoiceSessionManager, songbird_backend::SongbirdBackend};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("countdown_bot=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("⏱️ Starting Countdown Bot v{}", env!("CARGO_PKG_VERSION"));

    // Missing credentials stop the process here with a non-zero exit
    let config = Arc::new(Config::load()?);
    info!("{}", config.summary());

    if std::env::args().any(|arg| arg == "--deploy-commands") {
        return deploy_commands(&config).await;
    }

    let catalog = AudioCatalog::new(config.audio_dir.clone(), config.audio_extension.clone());
    for missing in catalog.missing_files() {
        warn!(
            "⚠️ Countdown clip {} not found in {}",
            missing,
            catalog.dir().display()
        );
    }

    // Voice
    let manager = Songbird::serenity();
    let (finished_tx, finished_rx) = flume::unbounded();
    let backend = Arc::new(SongbirdBackend::new(manager.clone(), finished_tx));
    let sessions = Arc::new(VoiceSessionManager::new(backend.clone()));
    let controller = Arc::new(PlaybackController::new(backend));

    tokio::spawn(pump_track_events(finished_rx, controller.clone()));

    let router = Arc::new(InteractionRouter::new(
        catalog,
        sessions,
        controller,
        RouterOptions {
            require_voice_for_controls: config.require_voice_for_controls,
            stop_on_channel_switch: config.stop_on_channel_switch,
        },
    ));

    // Keep-alive
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = keepalive::serve(port).await {
            error!("❌ {:?}", e);
        }
    });

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;
    let handler = CountdownBot::new(config.clone(), router);

    let mut client = Client::builder(&config.token, intents)
        .event_handler(handler)
        .register_songbird_with(manager)
        .await?;

    // Graceful shutdown
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error registering Ctrl+C handler: {:?}", e);
            return;
        }
        info!("⚠️ Shutdown signal received, closing...");
        shard_manager.shutdown_all().await;
    });

    info!("🚀 Bot started");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
        return Err(why.into());
    }

    Ok(())
}

/// Registers the slash command over HTTP and exits, without opening a
/// gateway session.
async fn deploy_commands(config: &Config) -> Result<()> {
    info!("🔄 Deploying commands...");

    let http = Http::new(&config.token);
    http.set_application_id(ApplicationId::new(config.client_id));

    commands::register_guild_commands(&http, GuildId::new(config.guild_id)).await?;

    info!("✅ Successfully registered commands.");
    Ok(())
}
