use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform-assigned channel identifier.
pub type ChannelId = u64;

/// A channel as seen by the collector: id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: String,
}

/// Kind of guild channel. Only text-like channels are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    Text,
    Announcement,
    Other,
}

impl ChannelKind {
    /// Whether messages can be read from this channel kind.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::Announcement)
    }
}

/// A channel belonging to a guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildChannel {
    pub channel: ChannelRef,
    pub kind: ChannelKind,
}

/// One chat message picked up during a digest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedMessage {
    pub id: u64,
    /// Owning channel.
    pub channel: ChannelRef,
    /// Whether the author is an automated account (bot or webhook).
    pub author_is_bot: bool,
    /// Raw message text.
    pub content: String,
    /// Deep link to the message.
    pub permalink: String,
    pub timestamp: DateTime<Utc>,
}

/// Parameters for a channel history fetch.
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    /// Only messages created after this instant.
    pub after: DateTime<Utc>,
    /// Only messages created before this instant.
    pub before: DateTime<Utc>,
    pub oldest_first: bool,
    /// Maximum number of messages to return, before any filtering.
    pub limit: usize,
}

/// Handle to a message the bot has posted, used to edit or delete it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel_id: ChannelId,
    pub message_id: u64,
}

/// A chat message picked up by command intake.
#[derive(Debug, Clone)]
pub struct IncomingCommand {
    pub channel_id: ChannelId,
    pub message_id: u64,
    pub author_id: u64,
    pub author_is_bot: bool,
    /// Full message text, prefix included.
    pub content: String,
}
