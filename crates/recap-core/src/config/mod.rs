mod defaults;
mod env;


pub use env::{apply_env, load_env_file, EnvSource};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::channel_ids::parse_channel_ids;
use crate::error::RecapError;
use crate::message::ChannelId;
use defaults::*;

/// Smallest accepted per-channel message cap.
pub const MIN_MAX_MESSAGES: usize = 10;
/// Smallest accepted collection timeout, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 30;

/// Top-level Recap configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recap: RecapConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapConfig {
    /// Language for bot replies ("English" or "Russian").
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            log_dir: default_log_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Discord connection and identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub guild_id: u64,
    /// Channel that receives the scheduled digest.
    #[serde(default)]
    pub summary_channel_id: u64,
    /// Role whose mention pulls a message into the digest from any channel.
    #[serde(default)]
    pub mention_role_id: u64,
    /// Role tagged at the end of the digest. Falls back to `mention_role_id`.
    #[serde(default)]
    pub digest_role_id: Option<u64>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Users allowed to run commands. Empty = everyone.
    #[serde(default)]
    pub admin_users: Vec<u64>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            guild_id: 0,
            summary_channel_id: 0,
            mention_role_id: 0,
            digest_role_id: None,
            command_prefix: default_command_prefix(),
            admin_users: Vec::new(),
        }
    }
}

impl DiscordConfig {
    /// Role tagged at the bottom of every digest.
    pub fn digest_role(&self) -> u64 {
        self.digest_role_id.unwrap_or(self.mention_role_id)
    }
}

/// Digest collection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Priority channels, comma-separated (`"123, 456"`).
    #[serde(default)]
    pub channels: String,
    #[serde(default = "default_true")]
    pub include_role_mentions: bool,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Title line of the first digest message. `{date}` is replaced.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            channels: String::new(),
            include_role_mentions: true,
            max_messages: default_max_messages(),
            timeout_secs: default_timeout_secs(),
            title: default_title(),
        }
    }
}

impl DigestConfig {
    /// The priority list, in configured order.
    pub fn priority_channels(&self) -> Vec<ChannelId> {
        parse_channel_ids(&self.channels)
    }
}

/// Daily schedule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local fire time, `HH:MM`.
    #[serde(default = "default_schedule_time")]
    pub time: String,
    /// IANA zone used for the schedule and the collection window.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_schedule_time(),
            timezone: default_timezone(),
        }
    }
}

impl SchedulerConfig {
    /// Parse the configured zone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, RecapError> {
        self.timezone
            .parse()
            .map_err(|_| RecapError::Config(format!("unknown timezone: {}", self.timezone)))
    }
}

impl Config {
    /// Check that everything needed to talk to Discord is present and sane.
    pub fn validate(&self) -> Result<(), RecapError> {
        let mut missing = Vec::new();
        if self.discord.bot_token.is_empty() {
            missing.push("DISCORD_SUMMARYBOT_TOKEN");
        }
        if self.discord.guild_id == 0 {
            missing.push("GUILD_ID");
        }
        if self.discord.summary_channel_id == 0 {
            missing.push("SUMMARY_ID");
        }
        if self.discord.mention_role_id == 0 {
            missing.push("SUMMARY_ROLE_ID");
        }
        if !missing.is_empty() {
            return Err(RecapError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }
        if self.digest.max_messages < MIN_MAX_MESSAGES {
            return Err(RecapError::Config(format!(
                "max_messages must be at least {MIN_MAX_MESSAGES}, got {}",
                self.digest.max_messages
            )));
        }
        if self.digest.timeout_secs < MIN_TIMEOUT_SECS {
            return Err(RecapError::Config(format!(
                "timeout_secs must be at least {MIN_TIMEOUT_SECS}, got {}",
                self.digest.timeout_secs
            )));
        }
        self.scheduler.tz()?;
        Ok(())
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, RecapError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| RecapError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| RecapError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

/// Load the TOML file, layer the environment on top, and validate.
pub fn resolve(config_path: &str, env: &EnvSource) -> Result<Config, RecapError> {
    let mut config = load(config_path)?;
    apply_env(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

/// Re-read the priority channel list for `reload_channels`.
///
/// The `.env` file wins when it sets `DISCORD_CHANNELS`; otherwise the TOML
/// file's `digest.channels` is used.
pub fn reload_priority_channels(
    config_path: &str,
    env_path: &str,
) -> Result<Vec<ChannelId>, RecapError> {
    let file_env = load_env_file(env_path)?;
    if let Some(raw) = file_env.get(env::CHANNELS) {
        tracing::info!("Raw DISCORD_CHANNELS: {raw}");
        return Ok(parse_channel_ids(raw));
    }
    Ok(load(config_path)?.digest.priority_channels())
}
