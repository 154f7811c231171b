//! # Bot Module
//!
//! Discord side of Countdown Bot.
//!
//! - [`commands`]: the `/countdown` slash command and its registration
//! - [`router`]: what each command or button does, independent of serenity
//! - [`handlers`]: serenity interactions in, interaction responses out
//! - [`events`]: songbird track events and the finished-menu repost
//!
//! ## Architecture
//!
//! [`CountdownBot`] implements Serenity's [`EventHandler`] trait and owns the
//! [`InteractionRouter`], which in turn owns the voice sessions and the
//! per-guild players. Nothing is kept in globals.

use serenity::{
    all::{Context, EventHandler, Interaction, Ready, VoiceState},
    async_trait,
    model::id::GuildId,
};
use std::sync::Arc;
use tracing::{error, info};

pub mod commands;
pub mod events;
pub mod handlers;
pub mod router;

use crate::{config::Config, voice::songbird_backend::SongbirdBackend};
use router::InteractionRouter;

/// Main Discord event handler.
pub struct CountdownBot {
    config: Arc<Config>,
    pub router: Arc<InteractionRouter<SongbirdBackend>>,
}

impl CountdownBot {
    pub fn new(config: Arc<Config>, router: Arc<InteractionRouter<SongbirdBackend>>) -> Self {
        Self { config, router }
    }
}

#[async_trait]
impl EventHandler for CountdownBot {
    /// Registers the guild command once the gateway session is up.
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("✅ Logged in as {}", ready.user.name);

        let guild_id = GuildId::new(self.config.guild_id);
        match commands::register_guild_commands(&ctx.http, guild_id).await {
            Ok(()) => info!("✅ Slash command registered in guild {}", guild_id),
            Err(e) => error!("❌ Error registering command: {:?}", e),
        }
    }

    /// Errors are logged and never take the bot down.
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command_interaction) => {
                if let Err(e) = handlers::handle_command(&ctx, command_interaction, self).await {
                    error!("Error handling command: {:?}", e);
                }
            }
            Interaction::Component(component_interaction) => {
                if let Err(e) = handlers::handle_component(&ctx, component_interaction, self).await
                {
                    error!("Error handling component: {:?}", e);
                }
            }
            _ => {}
        }
    }

    /// Keeps the session registry in line with where the platform put the bot
    /// (moved by a moderator, kicked, channel deleted, ...).
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let current_user_id = ctx.cache.current_user().id;
        if new.user_id != current_user_id {
            return;
        }

        let Some(guild_id) = new.guild_id else {
            return;
        };

        match new.channel_id {
            Some(channel_id) => self.router.handle_move(guild_id, channel_id),
            None if old.is_some() => self.router.handle_disconnect(guild_id).await,
            None => {}
        }
    }
}
