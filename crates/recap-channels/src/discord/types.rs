//! Discord REST API deserialization types.

use chrono::{DateTime, Utc};
use recap_core::message::ChannelKind;
use serde::Deserialize;

/// Error body returned by Discord on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct DcError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
    /// Present on 429 responses.
    pub retry_after: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: i64,
}

impl DcChannel {
    pub fn channel_kind(&self) -> ChannelKind {
        // 0 = GUILD_TEXT, 5 = GUILD_ANNOUNCEMENT.
        match self.kind {
            0 => ChannelKind::Text,
            5 => ChannelKind::Announcement,
            _ => ChannelKind::Other,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcMessage {
    pub id: String,
    pub author: DcUser,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set for messages posted through a webhook.
    #[serde(default)]
    pub webhook_id: Option<String>,
}

impl DcMessage {
    /// Bots and webhooks both count as automated authors.
    pub fn is_automated(&self) -> bool {
        self.author.bot || self.webhook_id.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcUser {
    #[serde(default)]
    pub bot: bool,
}
