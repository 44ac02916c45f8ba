use crate::{
    error::RecapError,
    message::{
        ChannelId, ChannelRef, CollectedMessage, GuildChannel, HistoryQuery, IncomingCommand,
        PostedMessage,
    },
};
use async_trait::async_trait;

/// Chat platform trait: everything the digest needs from the outside world.
///
/// The Discord REST client implements this; tests use an in-memory fake.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Human-readable platform name.
    fn name(&self) -> &str;

    /// List every channel of a guild, in the platform's order.
    async fn guild_channels(&self, guild_id: u64) -> Result<Vec<GuildChannel>, RecapError>;

    /// Fetch a channel's message history.
    async fn history(
        &self,
        channel: &ChannelRef,
        query: &HistoryQuery,
    ) -> Result<Vec<CollectedMessage>, RecapError>;

    /// Post a text message and return a handle to it.
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<PostedMessage, RecapError>;

    /// Replace the text of a previously posted message.
    async fn edit(&self, message: &PostedMessage, text: &str) -> Result<(), RecapError>;

    /// Delete a previously posted message.
    async fn delete(&self, message: &PostedMessage) -> Result<(), RecapError>;

    /// Start command intake. Returns a receiver that yields chat commands.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingCommand>, RecapError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), RecapError>;
}
