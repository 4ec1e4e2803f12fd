use thiserror::Error;

use palaver_agent::{PersonaError, ProviderError};
use palaver_transcript::TranscriptError;
use palaver_users::ProfileError;

/// Session-layer errors. A failed turn aborts the session; the user simply
/// stops receiving a reply (no user-facing error message is guaranteed).
#[derive(Debug, Error)]
pub enum SessionError {
    /// A messaging-platform call failed (send, thread creation, ...).
    #[error("platform error: {0}")]
    Platform(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Persona(#[from] PersonaError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
