//! The progress indicator: one posted message edited as collection advances.

use super::collector::ProgressReporter;
use crate::i18n;
use async_trait::async_trait;
use recap_core::{error::RecapError, message::PostedMessage, traits::ChatPlatform};

/// Edits a posted message with collection progress.
pub struct ProgressMessage<'a> {
    platform: &'a dyn ChatPlatform,
    handle: PostedMessage,
    lang: &'a str,
}

impl<'a> ProgressMessage<'a> {
    pub fn new(platform: &'a dyn ChatPlatform, handle: PostedMessage, lang: &'a str) -> Self {
        Self {
            platform,
            handle,
            lang,
        }
    }
}

#[async_trait]
impl ProgressReporter for ProgressMessage<'_> {
    async fn report(
        &self,
        processed: usize,
        total: usize,
        collected: usize,
    ) -> Result<(), RecapError> {
        let text = i18n::progress(self.lang, processed, total, collected);
        self.platform.edit(&self.handle, &text).await
    }

    async fn finish(&self, total: usize, collected: usize) -> Result<(), RecapError> {
        let text = i18n::progress_done(self.lang, total, collected);
        self.platform.edit(&self.handle, &text).await
    }
}
