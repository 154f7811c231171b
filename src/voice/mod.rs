//! # Voice Module
//!
//! Everything that touches the voice connection.
//!
//! - [`VoiceBackend`] is the seam between the bot and songbird. The session
//!   manager and the playback controller only talk to this trait.
//! - [`session`] keeps the one-connection-per-guild registry.
//! - [`songbird_backend`] implements the trait on top of `songbird::Songbird`.
//!
//! A running clip reports back through [`TrackFinished`] events sent over a
//! `flume` channel; each event carries the [`PlaybackToken`] it was started
//! with so late events from a replaced clip can be recognised.

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::fmt;

use crate::{audio::catalog::AudioResource, error::BotError};

pub mod session;
pub mod songbird_backend;

/// Identifies one started playback. Tokens only increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackToken(pub u64);

impl fmt::Display for PlaybackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sent when a clip stops producing audio (ended, errored or was stopped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackFinished {
    pub guild_id: GuildId,
    pub token: PlaybackToken,
}

/// Handle to a clip that is currently playing.
pub trait TrackControl: Send + Sync {
    fn stop(&self);
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceBackend: Send + Sync + 'static {
    /// Joins (or moves to) `channel_id` in `guild_id`.
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), BotError>;

    /// Destroys the guild's voice connection.
    async fn leave(&self, guild_id: GuildId) -> Result<(), BotError>;

    /// Starts `resource` on the guild's connection. The backend must emit a
    /// [`TrackFinished`] carrying `token` once the clip is over.
    async fn play(
        &self,
        guild_id: GuildId,
        resource: AudioResource,
        token: PlaybackToken,
    ) -> Result<Box<dyn TrackControl>, BotError>;
}
