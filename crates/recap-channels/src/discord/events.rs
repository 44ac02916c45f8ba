//! Gateway command intake and ChatPlatform trait implementation.

use super::DiscordChannel;
use async_trait::async_trait;
use recap_core::{
    error::RecapError,
    message::{
        ChannelId, ChannelRef, CollectedMessage, GuildChannel, HistoryQuery, IncomingCommand,
        PostedMessage,
    },
    traits::ChatPlatform,
};
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Message, Ready};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[async_trait]
impl ChatPlatform for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn guild_channels(&self, guild_id: u64) -> Result<Vec<GuildChannel>, RecapError> {
        self.fetch_guild_channels(guild_id).await
    }

    async fn history(
        &self,
        channel: &ChannelRef,
        query: &HistoryQuery,
    ) -> Result<Vec<CollectedMessage>, RecapError> {
        self.fetch_history(channel, query).await
    }

    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<PostedMessage, RecapError> {
        self.post_message(channel_id, text).await
    }

    async fn edit(&self, message: &PostedMessage, text: &str) -> Result<(), RecapError> {
        self.patch_message(message, text).await
    }

    async fn delete(&self, message: &PostedMessage) -> Result<(), RecapError> {
        self.delete_message(message).await
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingCommand>, RecapError> {
        let (tx, rx) = mpsc::channel(64);
        let handler = CommandHandler {
            tx,
            guild_id: self.config.guild_id,
            prefix: self.config.command_prefix.clone(),
        };

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| RecapError::Platform(format!("discord gateway setup failed: {e}")))?;

        *self.shards.lock().await = Some(client.shard_manager.clone());

        // The handler owns the only sender, so the receiver closes when the client exits.
        tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!("discord gateway stopped: {e}");
            }
        });

        info!("Discord gateway connecting for guild {}", self.config.guild_id);
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), RecapError> {
        if let Some(shards) = self.shards.lock().await.take() {
            shards.shutdown_all().await;
        }
        info!("Discord channel stopped");
        Ok(())
    }
}

/// Forwards prefixed guild messages to the command receiver.
struct CommandHandler {
    tx: mpsc::Sender<IncomingCommand>,
    guild_id: u64,
    prefix: String,
}

#[async_trait]
impl EventHandler for CommandHandler {
    async fn message(&self, _ctx: Context, msg: Message) {
        let incoming = GatewayMessage {
            guild_id: msg.guild_id.map(|g| g.get()),
            channel_id: msg.channel_id.get(),
            message_id: msg.id.get(),
            author_id: msg.author.id.get(),
            author_is_bot: msg.author.bot || msg.webhook_id.is_some(),
            content: &msg.content,
        };
        let Some(command) = incoming.into_command(self.guild_id, &self.prefix) else {
            return;
        };
        debug!("discord: command in {}: {}", command.channel_id, command.content);
        if self.tx.send(command).await.is_err() {
            debug!("discord command receiver dropped");
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Discord gateway ready as {}", ready.user.name);
    }
}

/// The parts of a gateway message that command intake looks at.
struct GatewayMessage<'a> {
    guild_id: Option<u64>,
    channel_id: ChannelId,
    message_id: u64,
    author_id: u64,
    author_is_bot: bool,
    content: &'a str,
}

impl GatewayMessage<'_> {
    /// A command when the message is in `guild_id` and starts with `prefix`.
    fn into_command(self, guild_id: u64, prefix: &str) -> Option<IncomingCommand> {
        if self.guild_id != Some(guild_id) {
            return None;
        }
        let content = self.content.trim();
        if !content.starts_with(prefix) {
            return None;
        }
        Some(IncomingCommand {
            channel_id: self.channel_id,
            message_id: self.message_id,
            author_id: self.author_id,
            author_is_bot: self.author_is_bot,
            content: content.to_string(),
        })
    }
}
