//! Fakes shared by the unit tests.

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    audio::{catalog::AudioResource, controller::IdleSubscriber},
    error::BotError,
    voice::{PlaybackToken, TrackControl, VoiceBackend},
};

pub fn resource(duration: u32) -> AudioResource {
    let file_name = format!("{}to0.mp3", duration);
    AudioResource {
        duration,
        path: PathBuf::from("audio").join(&file_name),
        file_name,
    }
}

/// Backend that records calls instead of touching a voice gateway.
#[derive(Default)]
pub struct FakeBackend {
    joins: Mutex<Vec<(GuildId, ChannelId)>>,
    leaves: Mutex<Vec<GuildId>>,
    plays: Mutex<Vec<(GuildId, AudioResource, PlaybackToken)>>,
    stops: Mutex<HashMap<PlaybackToken, Arc<AtomicUsize>>>,
    next_play_error: Mutex<Option<BotError>>,
}

impl FakeBackend {
    pub fn fail_next_play(&self, error: BotError) {
        *self.next_play_error.lock().unwrap() = Some(error);
    }

    pub fn joins(&self) -> Vec<(GuildId, ChannelId)> {
        self.joins.lock().unwrap().clone()
    }

    pub fn leaves(&self) -> Vec<GuildId> {
        self.leaves.lock().unwrap().clone()
    }

    pub fn plays(&self) -> Vec<(GuildId, AudioResource, PlaybackToken)> {
        self.plays.lock().unwrap().clone()
    }

    pub fn last_token(&self) -> Option<PlaybackToken> {
        self.plays.lock().unwrap().last().map(|(_, _, token)| *token)
    }

    pub fn stops_for(&self, token: PlaybackToken) -> usize {
        self.stops
            .lock()
            .unwrap()
            .get(&token)
            .map_or(0, |count| count.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl VoiceBackend for FakeBackend {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), BotError> {
        self.joins.lock().unwrap().push((guild_id, channel_id));
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), BotError> {
        self.leaves.lock().unwrap().push(guild_id);
        Ok(())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        resource: AudioResource,
        token: PlaybackToken,
    ) -> Result<Box<dyn TrackControl>, BotError> {
        if let Some(error) = self.next_play_error.lock().unwrap().take() {
            return Err(error);
        }

        let stops = Arc::new(AtomicUsize::new(0));
        self.stops.lock().unwrap().insert(token, stops.clone());
        self.plays.lock().unwrap().push((guild_id, resource, token));

        Ok(Box::new(FakeTrack { stops }))
    }
}

struct FakeTrack {
    stops: Arc<AtomicUsize>,
}

impl TrackControl for FakeTrack {
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts how many times it was notified.
#[derive(Clone, Default)]
pub struct CountingSubscriber {
    calls: Arc<AtomicUsize>,
}

impl CountingSubscriber {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdleSubscriber for CountingSubscriber {
    async fn on_idle(&self, _guild_id: GuildId) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
