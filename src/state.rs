//! Process-wide mutable state: runtime toggles and the priority channel list.
//!
//! Everything here lives in memory only and resets to configuration on restart.
//! Digest runs take a snapshot at start, so changes apply to later runs only.

use recap_core::{config::DigestConfig, message::ChannelId};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Settings an admin can change at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeToggles {
    /// Scan non-priority channels for role mentions.
    pub include_role_mentions: bool,
    /// Per-channel history cap.
    pub max_messages: usize,
    /// Collection deadline in seconds.
    pub timeout_secs: u64,
}

impl RuntimeToggles {
    pub fn from_config(cfg: &DigestConfig) -> Self {
        Self {
            include_role_mentions: cfg.include_role_mentions,
            max_messages: cfg.max_messages,
            timeout_secs: cfg.timeout_secs,
        }
    }
}

/// Point-in-time copy of [`BotState`].
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub toggles: RuntimeToggles,
    pub priority_channels: Vec<ChannelId>,
}

/// Shared, guarded bot state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BotState {
    inner: Arc<RwLock<StateSnapshot>>,
}

impl BotState {
    pub fn new(toggles: RuntimeToggles, priority_channels: Vec<ChannelId>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateSnapshot {
                toggles,
                priority_channels,
            })),
        }
    }

    pub fn from_config(cfg: &DigestConfig) -> Self {
        Self::new(RuntimeToggles::from_config(cfg), cfg.priority_channels())
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        self.inner.read().await.clone()
    }

    /// Flip role-mention inclusion and return the new value.
    pub async fn toggle_role_mentions(&self) -> bool {
        let mut state = self.inner.write().await;
        state.toggles.include_role_mentions = !state.toggles.include_role_mentions;
        state.toggles.include_role_mentions
    }

    pub async fn set_max_messages(&self, limit: usize) {
        self.inner.write().await.toggles.max_messages = limit;
    }

    pub async fn set_timeout_secs(&self, secs: u64) {
        self.inner.write().await.toggles.timeout_secs = secs;
    }

    /// Replace the priority list, returning the previous one.
    pub async fn replace_priority_channels(&self, channels: Vec<ChannelId>) -> Vec<ChannelId> {
        std::mem::replace(&mut self.inner.write().await.priority_channels, channels)
    }
}
