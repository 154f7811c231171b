use anyhow::Result;
use serenity::{builder::CreateCommand, http::Http, model::id::GuildId};

pub const COUNTDOWN: &str = "countdown";

/// Registers the bot's commands for one guild (propagates in about a second).
pub async fn register_guild_commands(http: impl AsRef<Http>, guild_id: GuildId) -> Result<()> {
    guild_id.set_commands(http, vec![countdown_command()]).await?;

    Ok(())
}

pub fn countdown_command() -> CreateCommand {
    CreateCommand::new(COUNTDOWN).description("Start a countdown in voice channel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_countdown_command_has_no_options() {
        let json = serde_json::to_value(countdown_command()).unwrap();

        assert_eq!(json["name"], "countdown");
        assert_eq!(json["description"], "Start a countdown in voice channel");
        assert!(json
            .get("options")
            .and_then(|o| o.as_array())
            .map_or(true, |o| o.is_empty()));
    }
}
