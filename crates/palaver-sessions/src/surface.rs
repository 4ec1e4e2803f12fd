//! Conversation surfaces: the only part of the session that differs
//! between the two interaction methods.
//!
//! One engine drives both. A surface decides how output reaches the user
//! (thread messages vs a reply chain), which inbound messages qualify as
//! "the next user turn" (anything in the thread vs a reply referencing the
//! last delivered message), and what teardown means (delete the thread vs
//! nothing).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use palaver_core::config::MAX_MESSAGE_CHARS;
use palaver_core::{ChannelId, MessageId};

use crate::error::Result;
use crate::gateway::{ChatGateway, InboundMessage};

/// Delivery and continuation capabilities for one session.
#[async_trait]
pub trait ConversationSurface: Send + Sync {
    /// The channel completions should flash the composing indicator in.
    fn channel(&self) -> ChannelId;

    /// Deliver reply text to the user, chunked to the platform cap.
    async fn deliver(&mut self, text: &str) -> Result<()>;

    /// Wait for the next message qualifying as a user turn. `None` means
    /// the wait timed out. Note this predicate is only about *where* the
    /// message appeared; the engine separately decides whether its author
    /// is admitted into the conversation.
    async fn next_turn(&mut self, timeout: Duration) -> Result<Option<InboundMessage>>;

    /// End-of-session cleanup.
    async fn teardown(&mut self) -> Result<()>;
}

/// Split into consecutive runs of at most `width` characters. Empty text
/// yields no chunks (and therefore no deliveries).
pub fn chunk_text(text: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for (i, ch) in text.chars().enumerate() {
        if i > 0 && i % width == 0 {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Thread-mode: a dedicated sub-channel scoped to the triggering message.
pub struct ThreadSurface {
    gateway: Arc<dyn ChatGateway>,
    thread: ChannelId,
}

impl ThreadSurface {
    pub fn new(gateway: Arc<dyn ChatGateway>, thread: ChannelId) -> Self {
        Self { gateway, thread }
    }
}

#[async_trait]
impl ConversationSurface for ThreadSurface {
    fn channel(&self) -> ChannelId {
        self.thread
    }

    async fn deliver(&mut self, text: &str) -> Result<()> {
        for chunk in chunk_text(text, MAX_MESSAGE_CHARS) {
            self.gateway.send(self.thread, &chunk).await?;
        }
        Ok(())
    }

    async fn next_turn(&mut self, timeout: Duration) -> Result<Option<InboundMessage>> {
        let thread = self.thread;
        let filter = move |m: &InboundMessage| m.channel == thread;
        Ok(self.gateway.next_message(timeout, &filter).await)
    }

    async fn teardown(&mut self) -> Result<()> {
        debug!(thread = %self.thread, "deleting session thread");
        self.gateway.delete_thread(self.thread).await
    }
}

/// Reply-mode: a reply chain in the original channel.
///
/// Replies always reference the triggering message; the continuation wait
/// keys off the *last delivered* chunk instead, so the user continues by
/// replying to the bot's most recent message.
pub struct ReplySurface {
    gateway: Arc<dyn ChatGateway>,
    channel: ChannelId,
    trigger: MessageId,
    last_delivered: Option<MessageId>,
}

impl ReplySurface {
    pub fn new(gateway: Arc<dyn ChatGateway>, channel: ChannelId, trigger: MessageId) -> Self {
        Self {
            gateway,
            channel,
            trigger,
            last_delivered: None,
        }
    }
}

#[async_trait]
impl ConversationSurface for ReplySurface {
    fn channel(&self) -> ChannelId {
        self.channel
    }

    async fn deliver(&mut self, text: &str) -> Result<()> {
        for chunk in chunk_text(text, MAX_MESSAGE_CHARS) {
            let id = self.gateway.reply(self.channel, self.trigger, &chunk).await?;
            self.last_delivered = Some(id);
        }
        Ok(())
    }

    async fn next_turn(&mut self, timeout: Duration) -> Result<Option<InboundMessage>> {
        // Until something has been delivered there is nothing to reply to,
        // so the wait can only expire.
        let Some(last) = self.last_delivered else {
            let nothing = |_: &InboundMessage| false;
            return Ok(self.gateway.next_message(timeout, &nothing).await);
        };
        let filter = move |m: &InboundMessage| m.reply_to == Some(last);
        Ok(self.gateway.next_message(timeout, &filter).await)
    }

    /// The channel persists for future independent triggers.
    async fn teardown(&mut self) -> Result<()> {
        Ok(())
    }
}
