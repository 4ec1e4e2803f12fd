use thiserror::Error;

use palaver_core::{DocumentError, UserId};

/// Profile-layer errors. Kept separate from the session layer so callers
/// can map them without coupling.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The settings document has no `id = 0` template record. Nothing can
    /// be defaulted without it, so every operation fails.
    #[error("settings template record (id = 0) not found")]
    MissingTemplate,

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("key not found for user {user}: {key}")]
    KeyNotFound { user: UserId, key: String },

    #[error("storage error: {0}")]
    Storage(#[from] DocumentError),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
