use async_trait::async_trait;
use serenity::{
    builder::CreateMessage,
    http::Http,
    model::id::{ChannelId, GuildId},
};
use songbird::{Event as VoiceEvent, EventContext, EventHandler as VoiceEventHandler};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::{
    audio::controller::{IdleSubscriber, PlaybackController},
    ui::buttons,
    voice::{PlaybackToken, TrackFinished, VoiceBackend},
};

/// Forwards a track's end (or error) to the controller's event loop.
pub struct TrackEndNotifier {
    pub guild_id: GuildId,
    pub token: PlaybackToken,
    pub finished: flume::Sender<TrackFinished>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<VoiceEvent> {
        if let EventContext::Track(track_list) = ctx {
            for (state, _handle) in *track_list {
                debug!(
                    "Track {} in guild {} reached {:?}",
                    self.token, self.guild_id, state.playing
                );
            }
        }

        let event = TrackFinished {
            guild_id: self.guild_id,
            token: self.token,
        };
        if self.finished.send(event).is_err() {
            warn!("Track event loop is gone, dropping finish for guild {}", self.guild_id);
        }

        None
    }
}

/// Drains finished-track events into the controller until every sender is
/// dropped.
///
/// Each event is handled on its own task so a slow subscriber (an HTTP send)
/// in one guild never holds up finishes in another. Outstanding handlers are
/// awaited before returning.
pub async fn pump_track_events<B: VoiceBackend>(
    events: flume::Receiver<TrackFinished>,
    controller: Arc<PlaybackController<B>>,
) {
    let mut handlers = JoinSet::new();

    while let Ok(TrackFinished { guild_id, token }) = events.recv_async().await {
        let controller = controller.clone();
        handlers.spawn(async move {
            controller.on_track_finished(guild_id, token).await;
        });

        while let Some(done) = handlers.try_join_next() {
            log_handler_result(done);
        }
    }

    while let Some(done) = handlers.join_next().await {
        log_handler_result(done);
    }

    info!("🔚 Track event loop stopped");
}

fn log_handler_result(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!("❌ Track finish handler failed: {:?}", e);
    }
}

/// Posts a fresh menu in the text channel a countdown was started from.
pub struct MenuRepost {
    pub http: Arc<Http>,
    pub channel_id: ChannelId,
}

#[async_trait]
impl IdleSubscriber for MenuRepost {
    async fn on_idle(&self, guild_id: GuildId) {
        let message = CreateMessage::new()
            .content(buttons::FINISHED_PROMPT)
            .components(buttons::create_menu_rows());

        // The user already got their acknowledgment; only log failures here
        if let Err(e) = self.channel_id.send_message(&self.http, message).await {
            error!(
                "❌ Error sending new buttons in guild {} channel {}: {:?}",
                guild_id, self.channel_id, e
            );
        }
    }
}
