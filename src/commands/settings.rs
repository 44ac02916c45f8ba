//! Runtime settings command handlers: toggle_role_mentions, set_max_messages,
//! set_timeout, reload_channels.

use super::CommandContext;
use crate::i18n;
use recap_core::{channel_ids::diff_channel_ids, config::reload_priority_channels};
use tracing::{error, info};

pub(super) async fn handle_toggle_role_mentions(ctx: &CommandContext<'_>) -> String {
    let enabled = ctx.digester.state().toggle_role_mentions().await;
    info!("role-mention collection: {enabled}");
    i18n::role_mentions_toggled(ctx.lang, enabled)
}

pub(super) async fn handle_set_max_messages(ctx: &CommandContext<'_>, limit: usize) -> String {
    ctx.digester.state().set_max_messages(limit).await;
    info!("max messages per channel: {limit}");
    i18n::max_messages_set(ctx.lang, limit)
}

pub(super) async fn handle_set_timeout(ctx: &CommandContext<'_>, secs: u64) -> String {
    ctx.digester.state().set_timeout_secs(secs).await;
    info!("collection timeout: {secs}s");
    i18n::timeout_set(ctx.lang, secs)
}

/// Re-read the priority list and report what changed.
pub(super) async fn handle_reload_channels(ctx: &CommandContext<'_>) -> String {
    let channels = match reload_priority_channels(ctx.config_path, ctx.env_path) {
        Ok(c) => c,
        Err(e) => {
            error!("reload_channels failed: {e}");
            return i18n::command_failed(ctx.lang, &e.to_string());
        }
    };
    let count = channels.len();
    let old = ctx
        .digester
        .state()
        .replace_priority_channels(channels.clone())
        .await;
    let (added, removed) = diff_channel_ids(&old, &channels);
    info!(
        "Channel list reloaded: {count} channels (+{} -{})",
        added.len(),
        removed.len()
    );
    i18n::channels_reloaded(ctx.lang, count, &added, &removed)
}
