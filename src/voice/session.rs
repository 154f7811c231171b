use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tracing::{debug, info};

use super::VoiceBackend;
use crate::error::BotError;

/// The bot's presence in one guild's voice channel.
#[derive(Debug, Clone)]
pub struct VoiceSession {
    pub channel_id: ChannelId,
    pub joined_at: DateTime<Utc>,
}

/// What `ensure_session` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Reused,
    Joined,
    Switched { from: ChannelId },
}

/// Keeps at most one voice session per guild.
pub struct VoiceSessionManager<B> {
    backend: Arc<B>,
    sessions: DashMap<GuildId, VoiceSession>,
}

impl<B: VoiceBackend> VoiceSessionManager<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            sessions: DashMap::new(),
        }
    }

    /// Reuses the guild's session when it is already in `channel_id`,
    /// otherwise joins. Join failures are returned as-is, never retried.
    pub async fn ensure_session(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<SessionOutcome, BotError> {
        // Copy out so no map guard is held across the join
        let previous = self.current_channel(guild_id);

        if previous == Some(channel_id) {
            debug!("Reusing voice session in guild {}", guild_id);
            return Ok(SessionOutcome::Reused);
        }

        self.backend.join(guild_id, channel_id).await?;
        self.sessions.insert(
            guild_id,
            VoiceSession {
                channel_id,
                joined_at: Utc::now(),
            },
        );

        match previous {
            Some(from) => {
                info!(
                    "🔀 Moved from channel {} to {} in guild {}",
                    from, channel_id, guild_id
                );
                Ok(SessionOutcome::Switched { from })
            }
            None => {
                info!("🔊 Joined voice channel {} in guild {}", channel_id, guild_id);
                Ok(SessionOutcome::Joined)
            }
        }
    }

    /// Leaves the guild's voice channel. Returns `false` if there was no
    /// session to tear down.
    pub async fn teardown(&self, guild_id: GuildId) -> Result<bool, BotError> {
        let Some((_, session)) = self.sessions.remove(&guild_id) else {
            return Ok(false);
        };

        self.backend.leave(guild_id).await?;

        info!(
            "👋 Left voice channel {} in guild {} after {}",
            session.channel_id,
            guild_id,
            session_length(&session)
        );
        Ok(true)
    }

    /// Records that the platform moved an existing session to `channel_id`.
    /// Returns the previous channel when it changed. Guilds without a
    /// session are left alone.
    pub fn record_move(&self, guild_id: GuildId, channel_id: ChannelId) -> Option<ChannelId> {
        let mut session = self.sessions.get_mut(&guild_id)?;
        if session.channel_id == channel_id {
            return None;
        }

        Some(std::mem::replace(&mut session.channel_id, channel_id))
    }

    /// Drops the record of a session the platform already closed.
    pub fn forget(&self, guild_id: GuildId) -> bool {
        self.sessions.remove(&guild_id).is_some()
    }

    pub fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.sessions.get(&guild_id).map(|s| s.channel_id)
    }
}

fn session_length(session: &VoiceSession) -> String {
    let elapsed = (Utc::now() - session.joined_at)
        .to_std()
        .unwrap_or_default();
    // Whole seconds are enough for a log line
    humantime::format_duration(std::time::Duration::from_secs(elapsed.as_secs())).to_string()
}
