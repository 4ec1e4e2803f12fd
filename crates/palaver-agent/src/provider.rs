use async_trait::async_trait;

use palaver_core::Turn;

/// One non-streaming request to a completion provider: the full ordered
/// conversation plus the model and output token ceiling.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Turn>,
    pub max_tokens: u32,
}

/// Common interface for completion providers.
///
/// Exactly one round-trip per call; no retry, no fallback reply. Failures
/// propagate to the session, which aborts the in-progress turn.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging and error messages.
    fn name(&self) -> &str;

    /// Submit the conversation, wait for the generated reply text.
    async fn complete(&self, req: &CompletionRequest) -> Result<String, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
}
