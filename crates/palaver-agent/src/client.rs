//! Completion round-trip with a concurrent composing heartbeat.
//!
//! The platform's typing indicator expires after a few seconds, so a
//! background task re-signals it every `COMPOSING_INTERVAL_SECS` while the
//! provider call is outstanding. The heartbeat is cancelled and awaited
//! before `complete` returns, whether the round-trip succeeded, failed,
//! or the caller dropped the future, so an indicator can never fire after
//! the reply has settled.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use palaver_core::config::{CompletionConfig, COMPOSING_INTERVAL_SECS};
use palaver_core::{ChannelId, Turn};

use crate::provider::{CompletionProvider, CompletionRequest, ProviderError};

/// Transient "agent is composing" signal, implemented by the platform
/// gateway.
#[async_trait]
pub trait ComposingIndicator: Send + Sync {
    async fn composing(&self, channel: ChannelId);
}

/// Wraps a provider with the heartbeat and the configured reply
/// substitutions.
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: CompletionConfig) -> Self {
        Self { provider, config }
    }

    /// One round-trip with the full conversation.
    ///
    /// Provider failures propagate uncaught; stopping the heartbeat is the
    /// only guaranteed cleanup.
    pub async fn complete(
        &self,
        indicator: Arc<dyn ComposingIndicator>,
        channel: ChannelId,
        conversation: &[Turn],
    ) -> Result<String, ProviderError> {
        let cancel = CancellationToken::new();
        // If this future is dropped mid-flight the guard cancels the token
        // and the heartbeat task winds itself down.
        let _guard = cancel.clone().drop_guard();
        let heartbeat = tokio::spawn(heartbeat_loop(indicator, channel, cancel.clone()));

        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: conversation.to_vec(),
            max_tokens: self.config.max_tokens,
        };
        let result = self.provider.complete(&request).await;

        // Stop the heartbeat and wait for it before touching the result so
        // no indicator outlives the round-trip, success or error.
        cancel.cancel();
        let _ = heartbeat.await;

        let mut text = result?;
        for r in &self.config.replacements {
            text = text.replace(&r.find, &r.replace);
        }
        debug!(provider = self.provider.name(), chars = text.len(), "completion settled");
        Ok(text)
    }
}

async fn heartbeat_loop(
    indicator: Arc<dyn ComposingIndicator>,
    channel: ChannelId,
    cancel: CancellationToken,
) {
    // First tick fires immediately, then every interval.
    let mut tick = tokio::time::interval(Duration::from_secs(COMPOSING_INTERVAL_SECS));
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tick.tick() => indicator.composing(channel).await,
        }
    }
}
