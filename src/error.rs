use thiserror::Error;

/// Failures surfaced to the user while handling an interaction.
///
/// Every variant is caught at the interaction boundary and turned into an
/// ephemeral reply; none of them terminate the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    #[error("the invoking user is not in a voice channel")]
    NotInVoiceChannel,

    #[error("audio file not found: {file}")]
    ResourceNotFound { file: String },

    #[error("the bot is not connected to a voice channel")]
    NotConnected,

    #[error("platform error: {0}")]
    Platform(String),
}

impl BotError {
    /// Text shown to the user in the ephemeral reply.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotInVoiceChannel => "❌ You must join a voice channel first.".to_string(),
            Self::ResourceNotFound { file } => format!("❌ File not found: {}", file),
            Self::NotConnected => "❌ Bot is not connected.".to_string(),
            Self::Platform(_) => "❌ Something went wrong, please try again.".to_string(),
        }
    }
}

impl From<serenity::Error> for BotError {
    fn from(value: serenity::Error) -> Self {
        Self::Platform(value.to_string())
    }
}

impl From<songbird::error::JoinError> for BotError {
    fn from(value: songbird::error::JoinError) -> Self {
        Self::Platform(value.to_string())
    }
}

impl From<songbird::tracks::ControlError> for BotError {
    fn from(value: songbird::tracks::ControlError) -> Self {
        Self::Platform(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            BotError::ResourceNotFound {
                file: "7to0.mp3".to_string()
            }
            .user_message(),
            "❌ File not found: 7to0.mp3"
        );
        assert_eq!(BotError::NotConnected.user_message(), "❌ Bot is not connected.");
        assert!(BotError::Platform("missing permissions".into())
            .user_message()
            .starts_with("❌"));
    }
}
