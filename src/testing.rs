//! In-memory chat platform for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recap_core::{
    error::RecapError,
    message::{
        ChannelId, ChannelKind, ChannelRef, CollectedMessage, GuildChannel, HistoryQuery,
        IncomingCommand, PostedMessage,
    },
    traits::ChatPlatform,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

/// Something the bot did to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Sent {
        channel_id: ChannelId,
        message_id: u64,
        text: String,
    },
    Edited {
        message_id: u64,
        text: String,
    },
    Deleted {
        message_id: u64,
    },
}

#[derive(Default)]
pub struct FakePlatform {
    channels: Vec<GuildChannel>,
    history: HashMap<ChannelId, Vec<CollectedMessage>>,
    failing_history: HashSet<ChannelId>,
    guild_missing: bool,
    history_delay: Option<Duration>,
    fail_sends: bool,
    fail_edits: bool,
    commands: Mutex<Vec<IncomingCommand>>,
    events: Mutex<Vec<Event>>,
    queries: Mutex<Vec<(ChannelId, HistoryQuery)>>,
    next_id: AtomicU64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, id: ChannelId, name: &str, kind: ChannelKind) -> Self {
        self.channels.push(GuildChannel {
            channel: ChannelRef {
                id,
                name: name.to_string(),
            },
            kind,
        });
        self
    }

    pub fn with_history(mut self, id: ChannelId, messages: Vec<CollectedMessage>) -> Self {
        self.history.insert(id, messages);
        self
    }

    pub fn with_failing_history(mut self, id: ChannelId) -> Self {
        self.failing_history.insert(id);
        self
    }

    pub fn with_missing_guild(mut self) -> Self {
        self.guild_missing = true;
        self
    }

    pub fn with_history_delay(mut self, delay: Duration) -> Self {
        self.history_delay = Some(delay);
        self
    }

    pub fn with_failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn with_failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn with_commands(self, commands: Vec<IncomingCommand>) -> Self {
        *self.commands.lock().unwrap() = commands;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Texts of all sent messages, in order.
    pub fn sent(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Sent { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<(ChannelId, HistoryQuery)> {
        self.queries.lock().unwrap().clone()
    }
}

/// A human message in `channel` at `at`.
pub fn message(
    channel_id: ChannelId,
    channel: &str,
    id: u64,
    content: &str,
    at: DateTime<Utc>,
) -> CollectedMessage {
    CollectedMessage {
        id,
        channel: ChannelRef {
            id: channel_id,
            name: channel.to_string(),
        },
        author_is_bot: false,
        content: content.to_string(),
        permalink: format!("https://discord.com/channels/1/{channel_id}/{id}"),
        timestamp: at,
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn name(&self) -> &str {
        "fake"
    }

    async fn guild_channels(&self, guild_id: u64) -> Result<Vec<GuildChannel>, RecapError> {
        if self.guild_missing {
            return Err(RecapError::Lookup(format!("guild {guild_id} not found")));
        }
        Ok(self.channels.clone())
    }

    async fn history(
        &self,
        channel: &ChannelRef,
        query: &HistoryQuery,
    ) -> Result<Vec<CollectedMessage>, RecapError> {
        self.queries
            .lock()
            .unwrap()
            .push((channel.id, query.clone()));
        if let Some(delay) = self.history_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_history.contains(&channel.id) {
            return Err(RecapError::Platform(format!("403 on {}", channel.id)));
        }
        // Returned as stored: window filtering is the caller's job.
        Ok(self.history.get(&channel.id).cloned().unwrap_or_default())
    }

    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<PostedMessage, RecapError> {
        if self.fail_sends {
            return Err(RecapError::Platform("send rejected".to_string()));
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(Event::Sent {
            channel_id,
            message_id,
            text: text.to_string(),
        });
        Ok(PostedMessage {
            channel_id,
            message_id,
        })
    }

    async fn edit(&self, message: &PostedMessage, text: &str) -> Result<(), RecapError> {
        if self.fail_edits {
            return Err(RecapError::Platform("edit rejected".to_string()));
        }
        self.events.lock().unwrap().push(Event::Edited {
            message_id: message.message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, message: &PostedMessage) -> Result<(), RecapError> {
        self.events.lock().unwrap().push(Event::Deleted {
            message_id: message.message_id,
        });
        Ok(())
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingCommand>, RecapError> {
        let (tx, rx) = mpsc::channel(16);
        let commands = std::mem::take(&mut *self.commands.lock().unwrap());
        for cmd in commands {
            let _ = tx.try_send(cmd);
        }
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), RecapError> {
        Ok(())
    }
}
