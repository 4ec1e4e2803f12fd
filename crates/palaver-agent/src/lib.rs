pub mod client;
pub mod directive;
pub mod openai;
pub mod persona;
pub mod provider;

pub use client::{CompletionClient, ComposingIndicator};
pub use directive::{scan, Directive, DirectiveDispatcher, DirectiveOutcome, InertDispatcher};
pub use openai::OpenAiProvider;
pub use persona::{PersonaError, PersonaResolver};
pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
