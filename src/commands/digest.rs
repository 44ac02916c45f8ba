//! On-demand digest commands: digest, digest_from.

use super::CommandContext;
use crate::i18n;
use recap_core::message::ChannelId;
use tracing::{info, warn};

/// Post an indicator in the invoking channel, then run the digest there.
pub(super) async fn handle_digest(ctx: &CommandContext<'_>, channels: Option<Vec<ChannelId>>) {
    let notice = match &channels {
        Some(ids) => i18n::preparing_channels(ctx.lang, ids.len()),
        None => i18n::t("progress_preparing", ctx.lang).to_string(),
    };
    let progress = match ctx.digester.platform().send(ctx.channel_id, &notice).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("cannot post progress indicator in {}: {e}", ctx.channel_id);
            None
        }
    };
    let outcome = ctx.digester.run(ctx.channel_id, channels, progress).await;
    info!("digest for channel {} finished: {outcome:?}", ctx.channel_id);
}
