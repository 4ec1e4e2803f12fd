use serde::{Deserialize, Serialize};

use palaver_core::{Conversation, MessageId, UserId};

/// The persisted transcript document: a flat list of entries, one per
/// triggering message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TranscriptDocument {
    pub entries: Vec<TranscriptEntry>,
}

impl TranscriptDocument {
    pub fn find_mut(&mut self, id: MessageId) -> Option<&mut TranscriptEntry> {
        self.entries.iter_mut().find(|e| e.transcript_id == id)
    }
}

/// One audited conversation, keyed by the message that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub transcript_id: MessageId,
    pub author_id: UserId,
    /// Local date, `%Y-%m-%d`.
    pub date: String,
    /// Local time, `%H:%M:%S`.
    pub time: String,
    /// Cumulative token count across every append for this id.
    pub tokens: u64,
    pub conversation: ConversationRecord,
}

/// Stored conversation body.
///
/// `message_count` accumulates across appends while `messages` holds only
/// the most recently appended conversation; the count and the list
/// deliberately disagree after repeated appends for one id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub message_count: u64,
    pub messages: Conversation,
}
