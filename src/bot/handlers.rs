use anyhow::Result;
use serenity::{
    builder::{CreateInteractionResponse, CreateInteractionResponseMessage},
    model::{
        application::{CommandInteraction, ComponentInteraction},
        id::{ChannelId, GuildId, UserId},
    },
    prelude::Context,
};
use tracing::{info, warn};

use super::{
    commands,
    events::MenuRepost,
    router::{Action, InteractionRequest, Reply},
    CountdownBot,
};
use crate::ui::buttons;

/// Handles slash commands
pub async fn handle_command(
    ctx: &Context,
    command: CommandInteraction,
    bot: &CountdownBot,
) -> Result<()> {
    let guild_id = command
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Command used outside a guild"))?;

    info!(
        "📝 Command /{} used by {} in guild {}",
        command.data.name, command.user.name, guild_id
    );

    let reply = match command.data.name.as_str() {
        commands::COUNTDOWN => {
            let request = InteractionRequest {
                guild_id,
                voice_channel: get_user_voice_channel(ctx, guild_id, command.user.id),
                action: Action::Menu,
            };
            route(ctx, command.channel_id, request, bot).await
        }
        _ => Reply::ephemeral("❌ Unknown command."),
    };

    command
        .create_response(&ctx.http, build_response(reply))
        .await?;

    Ok(())
}

/// Handles button presses on the countdown menu
pub async fn handle_component(
    ctx: &Context,
    component: ComponentInteraction,
    bot: &CountdownBot,
) -> Result<()> {
    let guild_id = component
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Component used outside a guild"))?;

    info!(
        "🔘 Button {} pressed by {} in guild {}",
        component.data.custom_id, component.user.name, guild_id
    );

    let request = InteractionRequest {
        guild_id,
        voice_channel: get_user_voice_channel(ctx, guild_id, component.user.id),
        action: Action::from_custom_id(&component.data.custom_id),
    };
    let reply = route(ctx, component.channel_id, request, bot).await;

    component
        .create_response(&ctx.http, build_response(reply))
        .await?;

    Ok(())
}

/// Runs the router and turns any failure into an ephemeral reply.
async fn route(
    ctx: &Context,
    text_channel: ChannelId,
    request: InteractionRequest,
    bot: &CountdownBot,
) -> Reply {
    let followup = Box::new(MenuRepost {
        http: ctx.http.clone(),
        channel_id: text_channel,
    });

    match bot.router.dispatch(request, followup).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("⚠️ Interaction failed: {}", e);
            Reply::from(e)
        }
    }
}

fn build_response(reply: Reply) -> CreateInteractionResponse {
    let mut message = CreateInteractionResponseMessage::new()
        .content(reply.content)
        .ephemeral(reply.ephemeral);

    if reply.with_menu {
        message = message.components(buttons::create_menu_rows());
    }

    CreateInteractionResponse::Message(message)
}

// Helpers

fn get_user_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = guild_id.to_guild_cached(&ctx.cache)?;

    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    /// Discord's `CHANNEL_MESSAGE_WITH_SOURCE` response type.
    const CHANNEL_MESSAGE: u64 = 4;
    const EPHEMERAL_FLAG: u64 = 1 << 6;

    fn to_json(reply: Reply) -> Value {
        serde_json::to_value(build_response(reply)).unwrap()
    }

    fn flags(json: &Value) -> u64 {
        json["data"]["flags"].as_u64().unwrap_or(0)
    }

    fn custom_ids(json: &Value) -> Vec<String> {
        json["data"]["components"]
            .as_array()
            .into_iter()
            .flatten()
            .flat_map(|row| row["components"].as_array().cloned().unwrap_or_default())
            .filter_map(|button| button["custom_id"].as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_error_reply_is_ephemeral_message() {
        let json = to_json(Reply::from(BotError::NotInVoiceChannel));

        assert_eq!(json["type"].as_u64(), Some(CHANNEL_MESSAGE));
        assert_eq!(
            json["data"]["content"].as_str(),
            Some(BotError::NotInVoiceChannel.user_message().as_str())
        );
        assert_eq!(flags(&json) & EPHEMERAL_FLAG, EPHEMERAL_FLAG);
        assert!(custom_ids(&json).is_empty());
    }

    #[test]
    fn test_public_reply_has_no_ephemeral_flag() {
        let json = to_json(Reply::public("⏹ Countdown stopped."));

        assert_eq!(json["type"].as_u64(), Some(CHANNEL_MESSAGE));
        assert_eq!(json["data"]["content"].as_str(), Some("⏹ Countdown stopped."));
        assert_eq!(flags(&json) & EPHEMERAL_FLAG, 0);
    }

    #[test]
    fn test_menu_reply_carries_buttons() {
        let json = to_json(Reply::menu());

        assert_eq!(json["data"]["content"].as_str(), Some(buttons::MENU_PROMPT));
        assert_eq!(flags(&json) & EPHEMERAL_FLAG, 0);
        assert_eq!(
            json["data"]["components"].as_array().map(Vec::len),
            Some(buttons::create_menu_rows().len())
        );

        let ids = custom_ids(&json);
        assert!(ids.contains(&buttons::count_id(5)));
        assert!(ids.contains(&buttons::count_id(30)));
        assert!(ids.contains(&buttons::button_ids::STOP.to_string()));
        assert!(ids.contains(&buttons::button_ids::LEAVE.to_string()));
    }
}
