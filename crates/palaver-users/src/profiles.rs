use serde_json::Value;
use tracing::{debug, instrument};

use palaver_core::{DocumentStore, UserId};

use crate::error::{ProfileError, Result};
use crate::types::{ProfileRecord, SettingsDocument};

/// Per-user settings backed by a whole-document store.
///
/// Every operation re-reads and rewrites the entire backing document; there
/// is no in-memory cache, so two concurrent writers race with
/// last-full-document-write-wins semantics. Missing keys on a real user
/// record are served from the `id = 0` template record.
pub struct UserProfiles<S> {
    store: S,
}

impl<S: DocumentStore<SettingsDocument>> UserProfiles<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read a setting, materialising the user record on first access.
    ///
    /// A user absent from the document is created as a template clone with
    /// only the id substituted, and that record is persisted before the
    /// value is returned. Keys absent from the record fall back to the
    /// template's value; keys in neither are an error.
    #[instrument(skip(self), fields(user = %user))]
    pub fn get(&self, user: UserId, key: &str) -> Result<Value> {
        let mut doc = self.store.load()?;
        let template = doc.template().ok_or(ProfileError::MissingTemplate)?.clone();

        if doc.find(user).is_none() {
            debug!("materialising user record from template");
            doc.users.push(ProfileRecord::from_template(&template, user));
            self.store.save(&doc)?;
        }

        // The record is present by now; re-borrow after the potential push.
        let record = doc.find(user).ok_or(ProfileError::UserNotFound(user))?;
        record
            .get(key)
            .or_else(|| template.get(key))
            .cloned()
            .ok_or_else(|| ProfileError::KeyNotFound {
                user,
                key: key.to_string(),
            })
    }

    /// Write a setting, materialising the user record first if needed and
    /// backfilling any template keys the record is missing.
    #[instrument(skip(self, value), fields(user = %user))]
    pub fn set(&self, user: UserId, key: &str, value: Value) -> Result<()> {
        let mut doc = self.store.load()?;
        let template = doc.template().ok_or(ProfileError::MissingTemplate)?.clone();

        if doc.find(user).is_none() {
            debug!("materialising user record from template");
            doc.users.push(ProfileRecord::from_template(&template, user));
        }

        let record = doc.find_mut(user).ok_or(ProfileError::UserNotFound(user))?;
        for (template_key, template_value) in &template.0 {
            if !record.contains_key(template_key) {
                record.insert(template_key, template_value.clone());
            }
        }
        record.insert(key, value);

        self.store.save(&doc)?;
        Ok(())
    }

    /// Remove a single key from an existing user record.
    ///
    /// Unlike `get`, the key is not re-backfilled from the template; it is
    /// genuinely absent afterwards until the next `get`/`set` touches it.
    #[instrument(skip(self), fields(user = %user))]
    pub fn delete(&self, user: UserId, key: &str) -> Result<()> {
        let mut doc = self.store.load()?;
        let record = doc.find_mut(user).ok_or(ProfileError::UserNotFound(user))?;
        record.remove(key).ok_or_else(|| ProfileError::KeyNotFound {
            user,
            key: key.to_string(),
        })?;
        self.store.save(&doc)?;
        Ok(())
    }

    /// Remove a whole user record.
    #[instrument(skip(self), fields(user = %user))]
    pub fn delete_user(&self, user: UserId) -> Result<()> {
        let mut doc = self.store.load()?;
        let before = doc.users.len();
        doc.users.retain(|u| u.id() != Some(user));
        if doc.users.len() == before {
            return Err(ProfileError::UserNotFound(user));
        }
        self.store.save(&doc)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::MemoryStore;
    use serde_json::json;

    fn profiles() -> UserProfiles<MemoryStore<SettingsDocument>> {
        let doc = SettingsDocument::with_template(&[
            ("interaction_method", json!("THREAD")),
            ("personality", json!("")),
        ]);
        UserProfiles::new(MemoryStore::new(doc))
    }

    #[test]
    fn get_materialises_user_from_template() {
        let profiles = profiles();
        let value = profiles.get(UserId(7), "interaction_method").expect("get");
        assert_eq!(value, json!("THREAD"));

        // The record was persisted, equal to the template with id swapped.
        let doc = profiles.store.load().unwrap();
        let record = doc.find(UserId(7)).expect("record persisted");
        assert_eq!(record.id(), Some(UserId(7)));
        assert_eq!(record.get("personality"), Some(&json!("")));
    }

    #[test]
    fn creation_is_idempotent() {
        let profiles = profiles();
        profiles.get(UserId(7), "personality").unwrap();
        profiles.get(UserId(7), "personality").unwrap();
        let doc = profiles.store.load().unwrap();
        assert_eq!(doc.users.len(), 2); // template + one user
    }

    #[test]
    fn missing_template_is_fatal() {
        let profiles: UserProfiles<MemoryStore<SettingsDocument>> =
            UserProfiles::new(MemoryStore::new(SettingsDocument::default()));
        assert!(matches!(
            profiles.get(UserId(1), "personality"),
            Err(ProfileError::MissingTemplate)
        ));
    }

    #[test]
    fn get_falls_back_to_template_after_delete_then_touch() {
        let profiles = profiles();
        profiles.set(UserId(7), "personality", json!("sassy")).unwrap();
        profiles.delete(UserId(7), "personality").unwrap();

        // Deleted key stays absent in storage...
        let doc = profiles.store.load().unwrap();
        assert!(!doc.find(UserId(7)).unwrap().contains_key("personality"));

        // ...but reads still serve the template value.
        assert_eq!(profiles.get(UserId(7), "personality").unwrap(), json!(""));
    }

    #[test]
    fn set_backfills_missing_template_keys() {
        let profiles = profiles();
        profiles.set(UserId(9), "personality", json!("pirate")).unwrap();
        profiles.delete(UserId(9), "interaction_method").unwrap();
        profiles.set(UserId(9), "personality", json!("sassy")).unwrap();

        let doc = profiles.store.load().unwrap();
        let record = doc.find(UserId(9)).unwrap();
        assert_eq!(record.get("interaction_method"), Some(&json!("THREAD")));
        assert_eq!(record.get("personality"), Some(&json!("sassy")));
    }

    #[test]
    fn delete_missing_key_or_user_errors() {
        let profiles = profiles();
        assert!(matches!(
            profiles.delete(UserId(3), "personality"),
            Err(ProfileError::UserNotFound(_))
        ));
        profiles.get(UserId(3), "personality").unwrap();
        assert!(matches!(
            profiles.delete(UserId(3), "nope"),
            Err(ProfileError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn delete_user_removes_record() {
        let profiles = profiles();
        profiles.get(UserId(5), "personality").unwrap();
        profiles.delete_user(UserId(5)).unwrap();
        assert!(matches!(
            profiles.delete_user(UserId(5)),
            Err(ProfileError::UserNotFound(_))
        ));
    }

    #[test]
    fn unknown_key_everywhere_is_not_found() {
        let profiles = profiles();
        assert!(matches!(
            profiles.get(UserId(2), "colour"),
            Err(ProfileError::KeyNotFound { .. })
        ));
    }
}
