use std::collections::HashMap;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::InteractionMethod;

// Relay constants shared across crates.
pub const MAX_MESSAGE_CHARS: usize = 2000; // platform hard cap per message
pub const CONTINUATION_TIMEOUT_SECS: u64 = 1200; // idle wait before a session ends
pub const COMPOSING_INTERVAL_SECS: u64 = 8; // typing indicator refresh cadence
pub const TOKEN_CHUNK_CHARS: usize = 1024; // transcript tokenizer chunk width
pub const THREAD_AUTO_ARCHIVE_MINS: u16 = 60; // idle archival for spawned threads

/// Top-level config (palaver.toml + PALAVER_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PalaverConfig {
    #[serde(default)]
    pub triggering: TriggeringConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub personas: PersonasConfig,
    #[serde(default)]
    pub formats: FormatsConfig,
    #[serde(default)]
    pub forced_method: ForcedMethodConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// What makes an inbound message open a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeringConfig {
    /// Literal prefixes that activate a new session.
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Case-fold both the message and the triggers before matching.
    #[serde(default = "bool_true")]
    pub ignore_case: bool,
    /// Strip markdown formatting symbols before matching.
    #[serde(default = "bool_true")]
    pub ignore_modifiers: bool,
}

impl Default for TriggeringConfig {
    fn default() -> Self {
        Self {
            triggers: Vec::new(),
            ignore_case: true,
            ignore_modifiers: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Literal substitutions applied in order to every raw reply
    /// (cosmetic fixes, banned phrases, etc).
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            replacements: Vec::new(),
        }
    }
}

/// One ordered literal string substitution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub find: String,
    pub replace: String,
}

/// Named system-prompt templates plus the default indirection.
///
/// `default` names the entry used when a user has no persona set (or has
/// chosen the reserved name "DEFAULT").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonasConfig {
    #[serde(default = "default_persona_name")]
    pub default: String,
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

impl Default for PersonasConfig {
    fn default() -> Self {
        Self {
            default: default_persona_name(),
            templates: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsConfig {
    /// Thread title template. Placeholders: {user}, {date}, {time}.
    #[serde(default = "default_thread_title")]
    pub thread_title: String,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self {
            thread_title: default_thread_title(),
        }
    }
}

/// Operator override that pins every user to one interaction method and
/// locks the self-service switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForcedMethodConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_forced_value")]
    pub value: InteractionMethod,
}

impl Default for ForcedMethodConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            value: default_forced_value(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
    #[serde(default = "default_transcript_path")]
    pub transcript_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            transcript_path: default_transcript_path(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_persona_name() -> String {
    "assistant".to_string()
}
fn default_thread_title() -> String {
    "Chat with {user} ({date} {time})".to_string()
}
fn default_forced_value() -> InteractionMethod {
    InteractionMethod::Reply
}
fn default_settings_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.palaver/settings.json", home)
}
fn default_transcript_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.palaver/transcript.json", home)
}

impl PalaverConfig {
    /// Load config from a TOML file with PALAVER_* env var overrides.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: PalaverConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PALAVER_").split("_"))
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.palaver/palaver.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = PalaverConfig::default();
        assert!(cfg.triggering.ignore_case);
        assert!(!cfg.forced_method.enabled);
        assert_eq!(cfg.completion.max_tokens, 1024);
    }

    #[test]
    fn toml_roundtrip_with_replacements() {
        let toml = r#"
            [triggering]
            triggers = ["hey bot"]
            ignore_case = true

            [completion]
            model = "gpt-4o"
            max_tokens = 512

            [[completion.replacements]]
            find = "robot"
            replace = "bot"

            [personas]
            default = "friendly"

            [personas.templates]
            friendly = "You are a friendly assistant."
        "#;
        let cfg: PalaverConfig = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .expect("parse");
        assert_eq!(cfg.triggering.triggers, vec!["hey bot".to_string()]);
        assert_eq!(cfg.completion.replacements.len(), 1);
        assert_eq!(cfg.personas.default, "friendly");
    }
}
