use thiserror::Error;

use palaver_core::DocumentError;

#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The BPE vocabulary failed to build. Happens once at construction,
    /// never per call.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("storage error: {0}")]
    Storage(#[from] DocumentError),
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
