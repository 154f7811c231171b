use async_trait::async_trait;
use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    audio::catalog::AudioResource,
    error::BotError,
    voice::{PlaybackToken, TrackControl, VoiceBackend},
};

/// Notified once when the clip it was registered with finishes on its own.
#[async_trait]
pub trait IdleSubscriber: Send + Sync {
    async fn on_idle(&self, guild_id: GuildId);
}

/// Observable state of one guild's player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Playing(AudioResource),
}

struct ActivePlayback {
    resource: AudioResource,
    token: PlaybackToken,
    track: Box<dyn TrackControl>,
}

#[derive(Default)]
enum PlayerState {
    #[default]
    Idle,
    Playing(ActivePlayback),
}

/// One guild's player: its state plus a single completion slot.
///
/// The slot is overwritten on every `play`, so at most one subscriber is
/// ever waiting for the current clip.
#[derive(Default)]
struct GuildPlayer {
    state: PlayerState,
    on_idle: Option<Box<dyn IdleSubscriber>>,
}

/// Drives `Idle`/`Playing` per guild.
///
/// Each guild owns its own player, so a clip started in one guild never
/// interrupts another guild. Every transition of a guild happens under that
/// guild's lock, including the await on the backend while a clip starts.
pub struct PlaybackController<B> {
    backend: Arc<B>,
    players: DashMap<GuildId, Arc<Mutex<GuildPlayer>>>,
    last_token: AtomicU64,
}

impl<B: VoiceBackend> PlaybackController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            players: DashMap::new(),
            last_token: AtomicU64::new(0),
        }
    }

    /// Makes sure the guild has a player. Calling it again changes nothing.
    pub fn attach(&self, guild_id: GuildId) {
        let _ = self.player(guild_id);
    }

    /// Stops whatever is playing in the guild and starts `resource`.
    ///
    /// `subscriber` replaces any previous one and fires only when this clip
    /// ends by itself. If the backend cannot start the clip the player is
    /// left idle.
    pub async fn play(
        &self,
        guild_id: GuildId,
        resource: AudioResource,
        subscriber: Box<dyn IdleSubscriber>,
    ) -> Result<PlaybackToken, BotError> {
        let player = self.player(guild_id);
        let mut guard = player.lock().await;

        guard.on_idle = None;
        if let PlayerState::Playing(previous) = std::mem::take(&mut guard.state) {
            debug!(
                "Stopping {} ({}) in guild {} before next clip",
                previous.resource.file_name, previous.token, guild_id
            );
            previous.track.stop();
        }

        let token = PlaybackToken(self.last_token.fetch_add(1, Ordering::Relaxed) + 1);
        let track = self
            .backend
            .play(guild_id, resource.clone(), token)
            .await?;

        info!("▶️ Playing {} ({}) in guild {}", resource.file_name, token, guild_id);

        guard.state = PlayerState::Playing(ActivePlayback {
            resource,
            token,
            track,
        });
        guard.on_idle = Some(subscriber);

        Ok(token)
    }

    /// Stops the current clip without notifying its subscriber.
    /// Returns `false` when the guild was already idle.
    pub async fn stop(&self, guild_id: GuildId) -> bool {
        let Some(player) = self.existing(guild_id) else {
            return false;
        };
        let mut guard = player.lock().await;

        guard.on_idle = None;
        match std::mem::take(&mut guard.state) {
            PlayerState::Playing(active) => {
                active.track.stop();
                info!("⏹️ Stopped {} in guild {}", active.resource.file_name, guild_id);
                true
            }
            PlayerState::Idle => false,
        }
    }

    /// Handles a finished event from the backend.
    ///
    /// Only the playback identified by `token` may move the guild to idle;
    /// events for clips that were replaced or stopped are ignored. Returns
    /// whether a subscriber was notified.
    pub async fn on_track_finished(&self, guild_id: GuildId, token: PlaybackToken) -> bool {
        let Some(player) = self.existing(guild_id) else {
            return false;
        };

        let subscriber = {
            let mut guard = player.lock().await;
            match &guard.state {
                PlayerState::Playing(active) if active.token == token => {}
                _ => {
                    debug!("Ignoring stale finish {} in guild {}", token, guild_id);
                    return false;
                }
            }

            guard.state = PlayerState::Idle;
            guard.on_idle.take()
        };

        info!("✅ Countdown {} finished in guild {}", token, guild_id);

        // Lock released: the subscriber may take a while
        match subscriber {
            Some(subscriber) => {
                subscriber.on_idle(guild_id).await;
                true
            }
            None => false,
        }
    }

    pub async fn status(&self, guild_id: GuildId) -> PlayerStatus {
        let Some(player) = self.existing(guild_id) else {
            return PlayerStatus::Idle;
        };
        let guard = player.lock().await;

        match &guard.state {
            PlayerState::Idle => PlayerStatus::Idle,
            PlayerState::Playing(active) => PlayerStatus::Playing(active.resource.clone()),
        }
    }

    /// Stops the guild's clip and drops its player entirely.
    pub async fn release(&self, guild_id: GuildId) {
        self.stop(guild_id).await;
        self.players.remove(&guild_id);
    }

    fn player(&self, guild_id: GuildId) -> Arc<Mutex<GuildPlayer>> {
        self.players
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(GuildPlayer::default())))
            .clone()
    }

    fn existing(&self, guild_id: GuildId) -> Option<Arc<Mutex<GuildPlayer>>> {
        self.players.get(&guild_id).map(|entry| entry.value().clone())
    }
}
