pub mod error;
pub mod log;
pub mod tokens;
pub mod types;

pub use error::TranscriptError;
pub use log::TranscriptLog;
pub use tokens::TokenCounter;
pub use types::{ConversationRecord, TranscriptDocument, TranscriptEntry};
