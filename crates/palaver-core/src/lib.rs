pub mod config;
pub mod document;
pub mod error;
pub mod types;

pub use config::PalaverConfig;
pub use document::{DocumentError, DocumentStore, JsonFileStore, MemoryStore};
pub use error::ConfigError;
pub use types::{
    interpolate, ChannelId, ChannelKind, Conversation, InteractionMethod, MessageId, Role, Turn,
    UserId,
};
