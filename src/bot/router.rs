use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    audio::{
        catalog::AudioCatalog,
        controller::{IdleSubscriber, PlaybackController},
    },
    error::BotError,
    ui::buttons::{button_ids, MENU_PROMPT},
    voice::{
        session::{SessionOutcome, VoiceSessionManager},
        VoiceBackend,
    },
};

/// What an interaction asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The `/countdown` command
    Menu,
    Play(u32),
    Stop,
    Leave,
    Unknown,
}

impl Action {
    pub fn from_custom_id(custom_id: &str) -> Self {
        match custom_id {
            button_ids::STOP => Self::Stop,
            button_ids::LEAVE => Self::Leave,
            other => other
                .strip_prefix(button_ids::COUNT_PREFIX)
                .filter(|n| is_canonical_number(n))
                .and_then(|n| n.parse().ok())
                .map_or(Self::Unknown, Self::Play),
        }
    }
}

/// Digits only, no sign and no leading zero, so each id maps to one file.
fn is_canonical_number(raw: &str) -> bool {
    !raw.is_empty() && !raw.starts_with('0') && raw.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone)]
pub struct InteractionRequest {
    pub guild_id: GuildId,
    /// Voice channel the invoking user is in, if any.
    pub voice_channel: Option<ChannelId>,
    pub action: Action,
}

/// Reply to send back for an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub ephemeral: bool,
    pub with_menu: bool,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
            with_menu: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            with_menu: false,
        }
    }

    pub fn menu() -> Self {
        Self {
            content: MENU_PROMPT.to_string(),
            ephemeral: false,
            with_menu: true,
        }
    }
}

impl From<BotError> for Reply {
    fn from(error: BotError) -> Self {
        Self::ephemeral(error.user_message())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// `stop` and `leave` also require the user to be in a voice channel.
    pub require_voice_for_controls: bool,
    /// Stop the current clip when the bot follows a user to another channel.
    pub stop_on_channel_switch: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            require_voice_for_controls: true,
            stop_on_channel_switch: false,
        }
    }
}

/// Dispatches commands and button presses to sessions and playback.
pub struct InteractionRouter<B> {
    catalog: AudioCatalog,
    sessions: Arc<VoiceSessionManager<B>>,
    controller: Arc<PlaybackController<B>>,
    options: RouterOptions,
}

impl<B: VoiceBackend> InteractionRouter<B> {
    pub fn new(
        catalog: AudioCatalog,
        sessions: Arc<VoiceSessionManager<B>>,
        controller: Arc<PlaybackController<B>>,
        options: RouterOptions,
    ) -> Self {
        Self {
            catalog,
            sessions,
            controller,
            options,
        }
    }

    /// Handles one interaction. `followup` is only kept when a clip starts;
    /// it fires once that clip finishes on its own.
    pub async fn dispatch(
        &self,
        request: InteractionRequest,
        followup: Box<dyn IdleSubscriber>,
    ) -> Result<Reply, BotError> {
        let guild_id = request.guild_id;

        match request.action {
            Action::Menu => {
                self.join_user(&request).await?;
                Ok(Reply::menu())
            }
            Action::Play(duration) => {
                self.join_user(&request).await?;
                let resource = self.catalog.resolve(duration)?;
                let file_name = resource.file_name.clone();

                self.controller.play(guild_id, resource, followup).await?;
                Ok(Reply::public(format!("▶️ Playing: {}", file_name)))
            }
            Action::Stop => {
                self.require_controls_voice(&request)?;
                if !self.controller.stop(guild_id).await {
                    debug!("Stop requested in idle guild {}", guild_id);
                }
                Ok(Reply::public("⏹ Countdown stopped."))
            }
            Action::Leave => {
                self.require_controls_voice(&request)?;
                // Nothing may post a finished menu after we are gone
                self.controller.stop(guild_id).await;
                if self.sessions.teardown(guild_id).await? {
                    Ok(Reply::public("👋 Bot has left the voice channel."))
                } else {
                    Err(BotError::NotConnected)
                }
            }
            Action::Unknown => Ok(Reply::ephemeral("❌ Unknown action.")),
        }
    }

    /// The platform moved the bot to another channel (e.g. a moderator
    /// dragged it). The next request from the old channel must rejoin.
    pub fn handle_move(&self, guild_id: GuildId, channel_id: ChannelId) {
        if let Some(from) = self.sessions.record_move(guild_id, channel_id) {
            info!(
                "🔀 Bot moved from channel {} to {} in guild {}",
                from, channel_id, guild_id
            );
        }
    }

    /// The platform closed the guild's connection without us asking.
    pub async fn handle_disconnect(&self, guild_id: GuildId) {
        if self.sessions.forget(guild_id) {
            info!("🔌 Voice session in guild {} closed by the platform", guild_id);
        }
        self.controller.release(guild_id).await;
    }

    async fn join_user(&self, request: &InteractionRequest) -> Result<(), BotError> {
        let channel_id = request.voice_channel.ok_or(BotError::NotInVoiceChannel)?;

        let outcome = self
            .sessions
            .ensure_session(request.guild_id, channel_id)
            .await?;

        if matches!(outcome, SessionOutcome::Switched { .. }) && self.options.stop_on_channel_switch
        {
            self.controller.stop(request.guild_id).await;
        }

        self.controller.attach(request.guild_id);
        Ok(())
    }

    fn require_controls_voice(&self, request: &InteractionRequest) -> Result<(), BotError> {
        if self.options.require_voice_for_controls && request.voice_channel.is_none() {
            return Err(BotError::NotInVoiceChannel);
        }
        Ok(())
    }
}
