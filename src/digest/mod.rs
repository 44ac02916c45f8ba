//! Digest orchestration: collect yesterday's messages under a deadline,
//! format them, and deliver the result.
//!
//! A run moves `Collecting → Formatting → Sent`, or ends early as
//! `Empty`, `TimedOut`, or `Failed`. Every run takes its own snapshot of
//! [`BotState`] and owns its progress indicator.

pub mod collector;
pub mod formatter;
pub mod progress;


use crate::i18n;
use crate::state::BotState;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use collector::{collect, CollectRequest, ProgressReporter};
use formatter::{format_digest, DigestLayout};
use progress::ProgressMessage;
use recap_core::{
    config::Config,
    error::RecapError,
    message::{ChannelId, CollectedMessage, PostedMessage},
    traits::ChatPlatform,
    window::{yesterday_window, TimeWindow},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Longest error detail shown in the failure notice.
const ERROR_DETAIL_CHARS: usize = 1500;

/// Fixed settings for every run.
#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub guild_id: u64,
    /// Destination of the scheduled digest.
    pub summary_channel_id: ChannelId,
    /// Role whose mention is collected from non-priority channels.
    pub mention_role_id: u64,
    /// Role tagged under the digest.
    pub digest_role_id: u64,
    /// Title template; `{date}` becomes the digest date.
    pub title: String,
    pub language: String,
    pub tz: Tz,
}

impl DigestSettings {
    pub fn from_config(cfg: &Config) -> Result<Self, RecapError> {
        Ok(Self {
            guild_id: cfg.discord.guild_id,
            summary_channel_id: cfg.discord.summary_channel_id,
            mention_role_id: cfg.discord.mention_role_id,
            digest_role_id: cfg.discord.digest_role(),
            title: cfg.digest.title.clone(),
            language: cfg.recap.language.clone(),
            tz: cfg.scheduler.tz()?,
        })
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    Sent { payloads: usize, messages: usize },
    Empty,
    TimedOut,
    Failed(String),
}

/// Runs digests against a chat platform.
pub struct Digester {
    platform: Arc<dyn ChatPlatform>,
    settings: DigestSettings,
    state: BotState,
}

impl Digester {
    pub fn new(platform: Arc<dyn ChatPlatform>, settings: DigestSettings, state: BotState) -> Self {
        Self {
            platform,
            settings,
            state,
        }
    }

    pub fn platform(&self) -> &Arc<dyn ChatPlatform> {
        &self.platform
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Scheduled entry point: post an indicator in the summary channel and
    /// digest the configured priority channels.
    pub async fn run_daily_summary(&self) -> Option<DigestOutcome> {
        info!("Running scheduled daily summary");
        let lang = self.settings.language.as_str();
        let progress = match self
            .platform
            .send(self.settings.summary_channel_id, i18n::t("progress_started", lang))
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                error!(
                    "daily summary: cannot post to channel {}: {e}",
                    self.settings.summary_channel_id
                );
                return None;
            }
        };
        let outcome = self
            .run(self.settings.summary_channel_id, None, Some(progress))
            .await;
        info!("daily summary finished: {outcome:?}");
        Some(outcome)
    }

    /// Run a digest now. `channel_ids` overrides the priority list for
    /// collection; section order always follows the priority list.
    pub async fn run(
        &self,
        destination: ChannelId,
        channel_ids: Option<Vec<ChannelId>>,
        progress: Option<PostedMessage>,
    ) -> DigestOutcome {
        let now = Utc::now().with_timezone(&self.settings.tz);
        self.run_at(now, destination, channel_ids, progress).await
    }

    /// [`Digester::run`] with an explicit clock.
    pub async fn run_at(
        &self,
        now: DateTime<Tz>,
        destination: ChannelId,
        channel_ids: Option<Vec<ChannelId>>,
        progress: Option<PostedMessage>,
    ) -> DigestOutcome {
        let snapshot = self.state.snapshot().await;
        let lang = self.settings.language.as_str();
        let window = yesterday_window(now);
        let targets = channel_ids.unwrap_or_else(|| snapshot.priority_channels.clone());

        let request = CollectRequest {
            guild_id: self.settings.guild_id,
            priority: &targets,
            toggles: &snapshot.toggles,
            mention_role_id: self.settings.mention_role_id,
            window: &window,
        };
        let reporter = progress
            .clone()
            .map(|handle| ProgressMessage::new(self.platform.as_ref(), handle, lang));
        let reporter_ref = reporter.as_ref().map(|r| r as &dyn ProgressReporter);

        let timeout_secs = snapshot.toggles.timeout_secs;
        let collected = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            collect(self.platform.as_ref(), &request, reporter_ref),
        )
        .await;

        let messages = match collected {
            Ok(messages) => messages,
            Err(_) => {
                error!("{}", RecapError::Timeout(timeout_secs));
                self.notify_timeout(destination, progress.as_ref(), timeout_secs)
                    .await;
                return DigestOutcome::TimedOut;
            }
        };

        let outcome = if messages.is_empty() {
            match self
                .platform
                .send(destination, i18n::t("no_messages", lang))
                .await
            {
                Ok(_) => {
                    info!("No messages for the digest");
                    DigestOutcome::Empty
                }
                Err(e) => self.fail(destination, e).await,
            }
        } else {
            match self
                .deliver(destination, &messages, &window, &snapshot.priority_channels)
                .await
            {
                Ok(payloads) => {
                    info!(
                        "Sent digest to channel {destination}: {payloads} message(s), {} entries",
                        messages.len()
                    );
                    DigestOutcome::Sent {
                        payloads,
                        messages: messages.len(),
                    }
                }
                Err(e) => self.fail(destination, e).await,
            }
        };

        if let Some(handle) = progress {
            match self.platform.delete(&handle).await {
                Ok(()) => info!("Progress indicator deleted"),
                Err(e) => warn!("failed to delete progress indicator: {e}"),
            }
        }
        outcome
    }

    /// Format and send the digest, returning the number of payloads sent.
    async fn deliver(
        &self,
        destination: ChannelId,
        messages: &[CollectedMessage],
        window: &TimeWindow,
        priority: &[ChannelId],
    ) -> Result<usize, RecapError> {
        let layout = DigestLayout {
            title: self.settings.title.replace("{date}", &window.label()),
            priority,
            role_tag: format!("<@&{}>", self.settings.digest_role_id),
            no_title: i18n::t("no_title", &self.settings.language),
        };
        let payloads = format_digest(messages, &layout);
        for payload in &payloads {
            self.platform.send(destination, payload).await?;
        }
        Ok(payloads.len())
    }

    async fn notify_timeout(
        &self,
        destination: ChannelId,
        progress: Option<&PostedMessage>,
        timeout_secs: u64,
    ) {
        let notice = i18n::timeout_notice(&self.settings.language, timeout_secs);
        let result = match progress {
            Some(handle) => self.platform.edit(handle, &notice).await,
            None => self.platform.send(destination, &notice).await.map(|_| ()),
        };
        if let Err(e) = result {
            error!("failed to report timeout: {e}");
        }
    }

    async fn fail(&self, destination: ChannelId, err: RecapError) -> DigestOutcome {
        error!("digest failed: {err}");
        let detail: String = err.to_string().chars().take(ERROR_DETAIL_CHARS).collect();
        let notice = i18n::digest_error(&self.settings.language, &detail);
        if let Err(e) = self.platform.send(destination, &notice).await {
            error!("failed to report digest error: {e}");
        }
        DigestOutcome::Failed(detail)
    }
}
