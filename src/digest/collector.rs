//! Message collection across priority and role-mention channels.

use crate::state::RuntimeToggles;
use async_trait::async_trait;
use recap_core::{
    error::RecapError,
    message::{ChannelId, ChannelRef, CollectedMessage, GuildChannel, HistoryQuery},
    traits::ChatPlatform,
    window::TimeWindow,
};
use tracing::{error, info, warn};

/// How a channel is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Every human-authored message.
    Full,
    /// Only messages that mention the digest role.
    MentionOnly,
}

/// Inputs for one collection pass.
#[derive(Debug, Clone, Copy)]
pub struct CollectRequest<'a> {
    pub guild_id: u64,
    /// Channels scanned in full, in this order.
    pub priority: &'a [ChannelId],
    pub toggles: &'a RuntimeToggles,
    pub mention_role_id: u64,
    pub window: &'a TimeWindow,
}

/// Receives collection progress. Failures are logged by the collector and
/// never abort the run.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, processed: usize, total: usize, collected: usize)
        -> Result<(), RecapError>;

    async fn finish(&self, total: usize, collected: usize) -> Result<(), RecapError>;
}

/// Decide which channels to scan and how.
///
/// Priority ids are resolved against `channels` in input order; unknown ids
/// are logged and skipped, repeats are dropped. With role mentions enabled,
/// every other text channel follows in guild order, mention-only.
pub fn plan_scan(
    channels: &[GuildChannel],
    priority: &[ChannelId],
    include_role_mentions: bool,
) -> Vec<(ChannelRef, ScanMode)> {
    let mut plan: Vec<(ChannelRef, ScanMode)> = Vec::new();

    for id in priority {
        if plan.iter().any(|(c, _)| c.id == *id) {
            continue;
        }
        match channels.iter().find(|c| c.channel.id == *id) {
            Some(found) => plan.push((found.channel.clone(), ScanMode::Full)),
            None => warn!("channel {id} not found in guild, skipping"),
        }
    }

    if include_role_mentions {
        let full: Vec<ChannelId> = plan.iter().map(|(c, _)| c.id).collect();
        plan.extend(
            channels
                .iter()
                .filter(|c| c.kind.is_text() && !full.contains(&c.channel.id))
                .map(|c| (c.channel.clone(), ScanMode::MentionOnly)),
        );
    }

    plan
}

/// Whether a fetched message belongs in the digest.
pub fn accept(msg: &CollectedMessage, mode: ScanMode, window: &TimeWindow, mention: &str) -> bool {
    if msg.author_is_bot || !window.contains(msg.timestamp) {
        return false;
    }
    match mode {
        ScanMode::Full => true,
        ScanMode::MentionOnly => msg.content.contains(mention),
    }
}

/// Collect yesterday's messages. Per-channel failures are logged and the
/// channel is skipped; an unreachable guild yields nothing.
pub async fn collect(
    platform: &dyn ChatPlatform,
    req: &CollectRequest<'_>,
    progress: Option<&dyn ProgressReporter>,
) -> Vec<CollectedMessage> {
    let window = req.window;
    info!(
        "Collecting messages from {} to {}",
        window.start.format("%d.%m.%Y %H:%M"),
        window.end.format("%d.%m.%Y %H:%M %:z")
    );

    let channels = match platform.guild_channels(req.guild_id).await {
        Ok(c) => c,
        Err(e) => {
            error!("cannot resolve guild {}: {e}", req.guild_id);
            return Vec::new();
        }
    };

    let plan = plan_scan(&channels, req.priority, req.toggles.include_role_mentions);
    let total = plan.len();
    let mention = format!("<@&{}>", req.mention_role_id);
    let query = HistoryQuery {
        after: window.start_utc(),
        before: window.end_utc(),
        oldest_first: true,
        limit: req.toggles.max_messages,
    };

    let mut messages = Vec::new();
    for (processed, (channel, mode)) in plan.iter().enumerate() {
        info!(
            "Scanning #{} ({})",
            channel.name,
            match mode {
                ScanMode::Full => "all messages",
                ScanMode::MentionOnly => "role mentions only",
            }
        );

        match platform.history(channel, &query).await {
            Ok(history) => {
                let before = messages.len();
                messages.extend(
                    history
                        .into_iter()
                        .take(req.toggles.max_messages)
                        .filter(|m| accept(m, *mode, window, &mention)),
                );
                info!("Found {} messages in #{}", messages.len() - before, channel.name);
            }
            Err(e) => error!("failed to scan #{}: {e}", channel.name),
        }

        if let Some(reporter) = progress {
            if let Err(e) = reporter.report(processed + 1, total, messages.len()).await {
                warn!("progress update failed: {e}");
            }
        }
    }

    if let Some(reporter) = progress {
        if let Err(e) = reporter.finish(total, messages.len()).await {
            warn!("progress update failed: {e}");
        }
    }

    info!("Collected {} messages from {total} channels", messages.len());
    messages
}
