use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime configuration.
///
/// The three Discord values are required; everything else has a default.
/// Sources, lowest precedence first: the JSON config file, then the process
/// environment (including anything loaded from `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    // Discord
    pub client_id: u64,
    pub guild_id: u64,
    pub token: String,

    // Audio
    pub audio_dir: PathBuf,
    pub audio_extension: String,

    // Keep-alive
    pub port: u16,

    // Behaviour
    pub stop_on_channel_switch: bool,
    pub require_voice_for_controls: bool,
}

/// Shape of the optional `config.json`, same keys as the deployment script.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    client_id: Option<String>,
    guild_id: Option<String>,
    token: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());
        let file = read_config_file(Path::new(&path))?;

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    fn from_sources(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str, fallback: Option<String>| -> Result<String> {
            env(key)
                .or(fallback)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{} is required (environment or config file)", key))
        };
        let optional = |key: &str, default: &str| -> String {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Self {
            // Discord
            client_id: parse_id("CLIENT_ID", &required("CLIENT_ID", file.client_id)?)?,
            guild_id: parse_id("GUILD_ID", &required("GUILD_ID", file.guild_id)?)?,
            token: required("TOKEN", file.token)?,

            // Audio
            audio_dir: optional("AUDIO_DIR", "audio").into(),
            audio_extension: optional("AUDIO_EXTENSION", "mp3"),

            // Keep-alive
            port: optional("PORT", "3000")
                .parse()
                .context("PORT must be a valid port number")?,

            // Behaviour
            stop_on_channel_switch: optional("STOP_ON_CHANNEL_SWITCH", "false")
                .parse()
                .context("STOP_ON_CHANNEL_SWITCH must be true or false")?,
            require_voice_for_controls: optional("REQUIRE_VOICE_FOR_CONTROLS", "true")
                .parse()
                .context("REQUIRE_VOICE_FOR_CONTROLS must be true or false")?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// Discord snowflakes are never zero, and the audio extension is used
    /// verbatim to build file names, so it must not carry a leading dot.
    pub fn validate(&self) -> Result<()> {
        if self.client_id == 0 {
            anyhow::bail!("CLIENT_ID must be a non-zero Discord id");
        }

        if self.guild_id == 0 {
            anyhow::bail!("GUILD_ID must be a non-zero Discord id");
        }

        if self.audio_extension.starts_with('.') || self.audio_extension.is_empty() {
            anyhow::bail!(
                "AUDIO_EXTENSION must be a bare extension like \"mp3\", got: {:?}",
                self.audio_extension
            );
        }

        Ok(())
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// The token is never included.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Discord: Client ID {} (Guild: {})\n  \
            Audio: {} (*.{})\n  \
            Keep-alive: port {}\n  \
            Behaviour: stop on channel switch={}, voice required for controls={}",
            self.client_id,
            self.guild_id,
            self.audio_dir.display(),
            self.audio_extension,
            self.port,
            self.stop_on_channel_switch,
            self.require_voice_for_controls,
        )
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(e).with_context(|| format!("cannot read config file {}", path.display())),
    }
}

fn parse_id(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .with_context(|| format!("{} must be a numeric Discord id, got: {:?}", key, raw))
}
