pub mod engine;
pub mod error;
pub mod gateway;
pub mod prefs;
pub mod surface;
pub mod trigger;

pub use engine::{SessionEngine, SessionOutcome};
pub use error::SessionError;
pub use gateway::{ChatGateway, InboundMessage};
pub use prefs::{MethodUpdate, Preferences};
pub use surface::{chunk_text, ConversationSurface, ReplySurface, ThreadSurface};
