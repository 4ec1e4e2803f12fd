use thiserror::Error;

/// Configuration-layer errors. Fatal to the operation that needed the
/// value, never to the host process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(String),

    #[error("invalid interaction method: {0} (expected THREAD or REPLY)")]
    InvalidMethod(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
