use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use palaver_agent::ComposingIndicator;
use palaver_core::{ChannelId, ChannelKind, MessageId, UserId};

use crate::error::Result;

/// A message-received notification from the messaging platform.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub channel_kind: ChannelKind,
    pub author: UserId,
    /// Display name, used for thread titles.
    pub author_name: String,
    pub author_is_bot: bool,
    pub content: String,
    /// Set when this message is a reply referencing a prior message.
    pub reply_to: Option<MessageId>,
}

/// Filter deciding which inbound message a wait should wake for.
pub type MessagePredicate = dyn Fn(&InboundMessage) -> bool + Send + Sync;

/// Outbound surface of the messaging platform.
///
/// Network transport lives behind this trait; the session layer never
/// talks to the platform directly.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send a message to a channel or thread; returns the delivered id.
    async fn send(&self, channel: ChannelId, text: &str) -> Result<MessageId>;

    /// Send a message as a reply to a prior message.
    async fn reply(&self, channel: ChannelId, to: MessageId, text: &str) -> Result<MessageId>;

    /// Open a thread scoped to `from`, with a bounded idle-archival window.
    async fn create_thread(
        &self,
        channel: ChannelId,
        from: MessageId,
        title: &str,
        auto_archive_mins: u16,
    ) -> Result<ChannelId>;

    async fn delete_thread(&self, thread: ChannelId) -> Result<()>;

    /// Flash the transient "composing" indicator. Best-effort; failures
    /// are swallowed by implementations.
    async fn composing(&self, channel: ChannelId);

    /// Block for the next inbound message matching `filter`, up to
    /// `timeout`. `None` means the wait expired, a normal terminal
    /// transition, not an error.
    async fn next_message(
        &self,
        timeout: Duration,
        filter: &MessagePredicate,
    ) -> Option<InboundMessage>;
}

/// Adapter exposing the gateway's composing signal to the completion
/// client's heartbeat.
pub struct GatewayComposing(pub Arc<dyn ChatGateway>);

#[async_trait]
impl ComposingIndicator for GatewayComposing {
    async fn composing(&self, channel: ChannelId) {
        self.0.composing(channel).await;
    }
}
