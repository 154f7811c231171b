use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::{input::File, tracks::TrackHandle, Event, Songbird, TrackEvent};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{PlaybackToken, TrackControl, TrackFinished, VoiceBackend};
use crate::{audio::catalog::AudioResource, bot::events::TrackEndNotifier, error::BotError};

/// [`VoiceBackend`] backed by the songbird manager registered on the client.
pub struct SongbirdBackend {
    manager: Arc<Songbird>,
    finished: flume::Sender<TrackFinished>,
}

impl SongbirdBackend {
    pub fn new(manager: Arc<Songbird>, finished: flume::Sender<TrackFinished>) -> Self {
        Self { manager, finished }
    }
}

#[async_trait]
impl VoiceBackend for SongbirdBackend {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), BotError> {
        self.manager.join(guild_id, channel_id).await?;
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), BotError> {
        self.manager.remove(guild_id).await?;
        Ok(())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        resource: AudioResource,
        token: PlaybackToken,
    ) -> Result<Box<dyn TrackControl>, BotError> {
        let call = self.manager.get(guild_id).ok_or(BotError::NotConnected)?;

        let input = File::new(resource.path.clone());
        let handle = call.lock().await.play_input(input.into());

        // End and Error both leave the player idle
        for event in [TrackEvent::End, TrackEvent::Error] {
            handle.add_event(
                Event::Track(event),
                TrackEndNotifier {
                    guild_id,
                    token,
                    finished: self.finished.clone(),
                },
            )?;
        }

        debug!("Started {} on songbird call in guild {}", resource.file_name, guild_id);
        Ok(Box::new(handle))
    }
}

impl TrackControl for TrackHandle {
    fn stop(&self) {
        if let Err(e) = TrackHandle::stop(self) {
            // The track already ended on its own
            warn!("Could not stop track: {:?}", e);
        }
    }
}
