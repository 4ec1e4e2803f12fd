use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Platform user identifier. The sentinel value `0` is reserved for the
/// settings template record and never belongs to a real account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// The settings template record carries this id.
    pub const TEMPLATE: UserId = UserId(0);

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Platform message identifier. Also keys transcript entries: one entry
/// per triggering message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Platform channel identifier. Threads spawned from a message get their
/// own `ChannelId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChannelId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Where a message arrived. Direct channels always force reply-mode
/// sessions because threads cannot be spawned inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Direct,
    Guild,
}

impl ChannelKind {
    pub fn is_direct(&self) -> bool {
        matches!(self, ChannelKind::Direct)
    }
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message unit within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub content: String,
    pub role: Role,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::System,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::User,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::Assistant,
        }
    }
}

/// Ordered turn sequence, append-only for the lifetime of a session.
pub type Conversation = Vec<Turn>;

/// How a user's sessions are carried: a dedicated thread spawned from the
/// triggering message, or a reply chain in the original channel.
///
/// Stored in the settings document as the wire strings "THREAD" / "REPLY".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InteractionMethod {
    Thread,
    Reply,
}

impl fmt::Display for InteractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMethod::Thread => write!(f, "THREAD"),
            InteractionMethod::Reply => write!(f, "REPLY"),
        }
    }
}

impl std::str::FromStr for InteractionMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "THREAD" => Ok(InteractionMethod::Thread),
            "REPLY" => Ok(InteractionMethod::Reply),
            other => Err(ConfigError::InvalidMethod(other.to_string())),
        }
    }
}

/// Substitute `{name}` placeholders in a template.
///
/// Unknown placeholders are left in place so a typo in a configured
/// template shows up verbatim instead of vanishing.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
