//! Self-service user preferences: interaction method and persona.
//!
//! Platform command registration stays outside the core; channel adapters
//! call these operations and phrase their own confirmations.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use palaver_agent::{PersonaError, PersonaResolver};
use palaver_core::config::ForcedMethodConfig;
use palaver_core::{DocumentStore, InteractionMethod, UserId};
use palaver_users::{SettingsDocument, UserProfiles};

use crate::error::Result;

/// What a method switch actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodUpdate {
    /// The value written (the forced one when the switch is locked).
    pub applied: InteractionMethod,
    /// True when the operator lock overrode the request; callers use this
    /// to tell the user their choice was not honoured.
    pub locked: bool,
}

pub struct Preferences<PS> {
    profiles: Arc<UserProfiles<PS>>,
    personas: Arc<PersonaResolver>,
    forced: ForcedMethodConfig,
}

impl<PS: DocumentStore<SettingsDocument>> Preferences<PS> {
    pub fn new(
        profiles: Arc<UserProfiles<PS>>,
        personas: Arc<PersonaResolver>,
        forced: ForcedMethodConfig,
    ) -> Self {
        Self {
            profiles,
            personas,
            forced,
        }
    }

    /// Switch between thread and reply sessions.
    ///
    /// When the forced-method lock is enabled the requested value is
    /// replaced by the configured one, and the write still happens; the
    /// lock changes what is stored, not whether it is stored.
    pub fn set_interaction_method(
        &self,
        user: UserId,
        requested: InteractionMethod,
    ) -> Result<MethodUpdate> {
        let (applied, locked) = if self.forced.enabled {
            (self.forced.value, true)
        } else {
            (requested, false)
        };

        self.profiles
            .set(user, "interaction_method", json!(applied.to_string()))?;
        info!(user = %user, method = %applied, locked, "interaction method set");
        Ok(MethodUpdate { applied, locked })
    }

    /// Choose a persona by name. Only configured templates are
    /// selectable; the reserved default indirection is not.
    pub fn set_persona(&self, user: UserId, name: &str) -> Result<()> {
        if !self.personas.is_selectable(name) {
            return Err(PersonaError::Unknown(name.to_string()).into());
        }
        self.profiles.set(user, "personality", json!(name))?;
        info!(user = %user, persona = %name, "persona set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use palaver_core::config::PersonasConfig;
    use palaver_core::MemoryStore;
    use serde_json::json;

    fn fixture(
        forced: ForcedMethodConfig,
    ) -> Preferences<MemoryStore<SettingsDocument>> {
        let doc = SettingsDocument::with_template(&[
            ("interaction_method", json!("THREAD")),
            ("personality", json!("")),
        ]);
        let profiles = Arc::new(UserProfiles::new(MemoryStore::new(doc)));

        let mut templates = HashMap::new();
        templates.insert("friendly".to_string(), "You are friendly.".to_string());
        templates.insert("pirate".to_string(), "You are a pirate.".to_string());
        let personas = Arc::new(PersonaResolver::new(PersonasConfig {
            default: "friendly".to_string(),
            templates,
        }));

        Preferences::new(profiles, personas, forced)
    }

    #[test]
    fn unlocked_switch_stores_the_request() {
        let prefs = fixture(ForcedMethodConfig::default());
        let update = prefs
            .set_interaction_method(UserId(1), InteractionMethod::Reply)
            .unwrap();
        assert_eq!(update.applied, InteractionMethod::Reply);
        assert!(!update.locked);
        assert_eq!(
            prefs.profiles.get(UserId(1), "interaction_method").unwrap(),
            json!("REPLY")
        );
    }

    #[test]
    fn lock_overrides_the_request_but_still_writes() {
        let prefs = fixture(ForcedMethodConfig {
            enabled: true,
            value: InteractionMethod::Thread,
        });
        let update = prefs
            .set_interaction_method(UserId(1), InteractionMethod::Reply)
            .unwrap();
        assert_eq!(update.applied, InteractionMethod::Thread);
        assert!(update.locked);
        // The overridden value really is persisted.
        assert_eq!(
            prefs.profiles.get(UserId(1), "interaction_method").unwrap(),
            json!("THREAD")
        );
    }

    #[test]
    fn persona_must_be_a_configured_template() {
        let prefs = fixture(ForcedMethodConfig::default());
        prefs.set_persona(UserId(2), "pirate").unwrap();
        assert_eq!(
            prefs.profiles.get(UserId(2), "personality").unwrap(),
            json!("pirate")
        );
        assert!(prefs.set_persona(UserId(2), "wizard").is_err());
        assert!(prefs.set_persona(UserId(2), "DEFAULT").is_err());
    }
}
