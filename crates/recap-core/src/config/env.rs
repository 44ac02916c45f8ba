//! Environment-variable overrides on top of the TOML file.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use super::Config;
use crate::error::RecapError;

pub(super) const TOKEN: &str = "DISCORD_SUMMARYBOT_TOKEN";
pub(super) const GUILD: &str = "GUILD_ID";
pub(super) const SUMMARY_CHANNEL: &str = "SUMMARY_ID";
pub(super) const MENTION_ROLE: &str = "SUMMARY_ROLE_ID";
pub(super) const DIGEST_ROLE: &str = "DIGEST_ROLE_ID";
pub(super) const CHANNELS: &str = "DISCORD_CHANNELS";
pub(super) const INCLUDE_ROLE_MENTIONS: &str = "INCLUDE_ROLE_MENTIONS";
pub(super) const MAX_MESSAGES: &str = "MAX_MESSAGES";
pub(super) const TIMEOUT: &str = "COLLECTION_TIMEOUT";

/// A snapshot of key/value settings (process environment or a `.env` file).
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a key. Blank values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, RecapError>
    where
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| RecapError::Config(format!("{key}: invalid value '{raw}': {e}")))
            })
            .transpose()
    }
}

/// Read a `.env` file without touching the process environment.
///
/// A missing file yields an empty source.
pub fn load_env_file(path: &str) -> Result<EnvSource, RecapError> {
    if !Path::new(path).exists() {
        return Ok(EnvSource::default());
    }
    let iter = dotenvy::from_path_iter(path)
        .map_err(|e| RecapError::Config(format!("failed to read {path}: {e}")))?;
    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) =
            item.map_err(|e| RecapError::Config(format!("failed to parse {path}: {e}")))?;
        vars.insert(key, value);
    }
    Ok(EnvSource { vars })
}

/// Override config fields with any settings present in `env`.
pub fn apply_env(config: &mut Config, env: &EnvSource) -> Result<(), RecapError> {
    if let Some(token) = env.get(TOKEN) {
        config.discord.bot_token = token.to_string();
    }
    if let Some(id) = env.parse(GUILD)? {
        config.discord.guild_id = id;
    }
    if let Some(id) = env.parse(SUMMARY_CHANNEL)? {
        config.discord.summary_channel_id = id;
    }
    if let Some(id) = env.parse(MENTION_ROLE)? {
        config.discord.mention_role_id = id;
    }
    if let Some(id) = env.parse(DIGEST_ROLE)? {
        config.discord.digest_role_id = Some(id);
    }
    if let Some(raw) = env.get(CHANNELS) {
        config.digest.channels = raw.to_string();
    }
    if let Some(raw) = env.get(INCLUDE_ROLE_MENTIONS) {
        config.digest.include_role_mentions = raw.eq_ignore_ascii_case("true");
    }
    if let Some(n) = env.parse(MAX_MESSAGES)? {
        config.digest.max_messages = n;
    }
    if let Some(n) = env.parse(TIMEOUT)? {
        config.digest.timeout_secs = n;
    }
    Ok(())
}
