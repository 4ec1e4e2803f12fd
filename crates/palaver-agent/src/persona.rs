use thiserror::Error;
use tracing::debug;

use palaver_core::config::PersonasConfig;
use palaver_core::interpolate;

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("unknown persona: {0}")]
    Unknown(String),

    /// The configured default indirection points at a template that does
    /// not exist.
    #[error("default persona '{0}' has no template")]
    BrokenDefault(String),
}

/// Maps a user's chosen persona name to its system-prompt template.
pub struct PersonaResolver {
    config: PersonasConfig,
}

/// The reserved name that indirects to the configured default persona.
pub const DEFAULT_PERSONA: &str = "DEFAULT";

impl PersonaResolver {
    pub fn new(config: PersonasConfig) -> Self {
        Self { config }
    }

    /// Resolve a persona name to its rendered template.
    ///
    /// `None`, the empty string and the reserved name `DEFAULT` all
    /// indirect through the configured default persona. An unset persona
    /// falling through to the default is deliberate, not an error path.
    pub fn resolve(&self, name: Option<&str>) -> Result<String, PersonaError> {
        let template = match name {
            None | Some("") | Some(DEFAULT_PERSONA) => {
                debug!(default = %self.config.default, "persona falls through to default");
                self.config
                    .templates
                    .get(&self.config.default)
                    .ok_or_else(|| PersonaError::BrokenDefault(self.config.default.clone()))?
            }
            Some(chosen) => self
                .config
                .templates
                .get(chosen)
                .ok_or_else(|| PersonaError::Unknown(chosen.to_string()))?,
        };

        // Free variable slots. None are live right now, but templates may
        // already carry placeholders for future use.
        Ok(interpolate(template, &[]))
    }

    /// Persona names a user may select. The reserved indirection name is
    /// excluded; choosing the default happens by clearing the setting.
    pub fn selectable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .config
            .templates
            .keys()
            .map(String::as_str)
            .filter(|n| *n != DEFAULT_PERSONA)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn is_selectable(&self, name: &str) -> bool {
        name != DEFAULT_PERSONA && self.config.templates.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolver() -> PersonaResolver {
        let mut templates = HashMap::new();
        templates.insert("friendly".to_string(), "You are friendly.".to_string());
        templates.insert("pirate".to_string(), "You are a pirate.".to_string());
        PersonaResolver::new(PersonasConfig {
            default: "friendly".to_string(),
            templates,
        })
    }

    #[test]
    fn unset_empty_and_reserved_all_resolve_to_default() {
        let r = resolver();
        let expected = "You are friendly.";
        assert_eq!(r.resolve(None).unwrap(), expected);
        assert_eq!(r.resolve(Some("")).unwrap(), expected);
        assert_eq!(r.resolve(Some("DEFAULT")).unwrap(), expected);
    }

    #[test]
    fn named_persona_resolves_directly() {
        assert_eq!(
            resolver().resolve(Some("pirate")).unwrap(),
            "You are a pirate."
        );
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(matches!(
            resolver().resolve(Some("wizard")),
            Err(PersonaError::Unknown(_))
        ));
    }

    #[test]
    fn broken_default_indirection_is_an_error() {
        let r = PersonaResolver::new(PersonasConfig {
            default: "missing".to_string(),
            templates: HashMap::new(),
        });
        assert!(matches!(
            r.resolve(None),
            Err(PersonaError::BrokenDefault(_))
        ));
    }

    #[test]
    fn selectable_names_exclude_reserved() {
        let r = resolver();
        assert_eq!(r.selectable_names(), vec!["friendly", "pirate"]);
        assert!(!r.is_selectable("DEFAULT"));
        assert!(r.is_selectable("pirate"));
    }
}
