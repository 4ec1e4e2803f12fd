use chrono::Local;
use tracing::{debug, instrument};

use palaver_core::{DocumentStore, MessageId, Turn, UserId};

use crate::error::Result;
use crate::tokens::TokenCounter;
use crate::types::{ConversationRecord, TranscriptDocument, TranscriptEntry};

/// Append/merge-on-id log of full conversations for audit and analytics.
///
/// Repeat appends for one id accumulate the token and message counters but
/// *replace* the stored message list with the conversation just passed in.
/// Because the session loop appends the full conversation after every
/// round, the counters end up double-counting earlier turns. That is the
/// historical behaviour and downstream analytics rely on it; keep it.
pub struct TranscriptLog<S> {
    store: S,
    counter: TokenCounter,
}

impl<S: DocumentStore<TranscriptDocument>> TranscriptLog<S> {
    pub fn new(store: S) -> Result<Self> {
        Ok(Self {
            store,
            counter: TokenCounter::new()?,
        })
    }

    /// Record the current state of a conversation under its trigger id.
    #[instrument(skip(self, conversation), fields(id = %conversation_id, author = %author_id, turns = conversation.len()))]
    pub fn append(
        &self,
        conversation_id: MessageId,
        author_id: UserId,
        conversation: &[Turn],
    ) -> Result<()> {
        let mut doc = self.store.load()?;
        let total_tokens = self.counter.count_conversation(conversation);

        match doc.find_mut(conversation_id) {
            Some(entry) => {
                entry.tokens += total_tokens;
                entry.conversation.message_count += conversation.len() as u64;
                entry.conversation.messages = conversation.to_vec();
                debug!(tokens = entry.tokens, "transcript entry merged");
            }
            None => {
                let now = Local::now();
                doc.entries.push(TranscriptEntry {
                    transcript_id: conversation_id,
                    author_id,
                    date: now.format("%Y-%m-%d").to_string(),
                    time: now.format("%H:%M:%S").to_string(),
                    tokens: total_tokens,
                    conversation: ConversationRecord {
                        message_count: conversation.len() as u64,
                        messages: conversation.to_vec(),
                    },
                });
                debug!(tokens = total_tokens, "transcript entry created");
            }
        }

        self.store.save(&doc)?;
        Ok(())
    }

    /// Read the current document, for audit/analytics consumers.
    pub fn load(&self) -> Result<TranscriptDocument> {
        Ok(self.store.load()?)
    }
}
