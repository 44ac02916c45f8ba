//! Discord channel over the REST API.
//!
//! Reads guild channels and message history, posts and edits digest
//! messages over REST, and takes `!` commands from the gateway.
//! Docs: <https://discord.com/developers/docs/resources/message>

mod events;
pub(crate) mod rest;
pub(crate) mod types;

use chrono::{DateTime, Utc};
use recap_core::config::DiscordConfig;
use serenity::all::ShardManager;
use std::sync::Arc;
use tokio::sync::Mutex;

const API_BASE: &str = "https://discord.com/api/v10";

/// First second of 2015, the Discord snowflake epoch (milliseconds).
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Discord bot using REST calls for history and posting, and the gateway for commands.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
    base_url: String,
    /// Set while the gateway client runs.
    shards: Mutex<Option<Arc<ShardManager>>>,
}

impl DiscordChannel {
    /// Create a new Discord channel from config.
    pub fn new(config: DiscordConfig) -> Self {
        Self::with_base_url(config, API_BASE)
    }

    /// Create a client against a different API root (proxies, tests).
    pub fn with_base_url(config: DiscordConfig, base_url: &str) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            shards: Mutex::new(None),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }

    /// Deep link to a message in the configured guild.
    pub fn permalink(&self, channel_id: u64, message_id: u64) -> String {
        message_permalink(self.config.guild_id, channel_id, message_id)
    }
}

/// `https://discord.com/channels/{guild}/{channel}/{message}`.
pub fn message_permalink(guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!("https://discord.com/channels/{guild_id}/{channel_id}/{message_id}")
}

/// Smallest snowflake that could have been created at `at`.
pub fn snowflake_from_time(at: DateTime<Utc>) -> u64 {
    let ms = (at.timestamp_millis() - DISCORD_EPOCH_MS).max(0) as u64;
    ms << 22
}

/// Creation time encoded in a snowflake.
pub fn time_from_snowflake(id: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis((id >> 22) as i64 + DISCORD_EPOCH_MS)
}

/// Parse a snowflake string as sent in JSON payloads.
pub(crate) fn parse_snowflake(raw: &str) -> Option<u64> {
    raw.parse().ok()
}
