use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use palaver_core::UserId;

/// The persisted settings document: one flat list of profile records.
///
/// The record with `id = 0` is the template supplying fallback values for
/// every key a real user record lacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SettingsDocument {
    pub users: Vec<ProfileRecord>,
}

impl SettingsDocument {
    /// Seed a document with a template record built from key/value pairs.
    pub fn with_template(keys: &[(&str, Value)]) -> Self {
        let mut record = ProfileRecord::empty(UserId::TEMPLATE);
        for (key, value) in keys {
            record.insert(key, value.clone());
        }
        Self {
            users: vec![record],
        }
    }

    pub fn template(&self) -> Option<&ProfileRecord> {
        self.find(UserId::TEMPLATE)
    }

    pub fn find(&self, id: UserId) -> Option<&ProfileRecord> {
        self.users.iter().find(|u| u.id() == Some(id))
    }

    pub fn find_mut(&mut self, id: UserId) -> Option<&mut ProfileRecord> {
        self.users.iter_mut().find(|u| u.id() == Some(id))
    }
}

/// One user's settings: an open key/value object carrying `id` plus
/// arbitrary setting keys ("interaction_method", "personality", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord(pub Map<String, Value>);

impl ProfileRecord {
    pub fn empty(id: UserId) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::from(id.as_u64()));
        Self(map)
    }

    /// Clone another record (typically the template), substituting the id.
    pub fn from_template(template: &ProfileRecord, id: UserId) -> Self {
        let mut record = template.clone();
        record
            .0
            .insert("id".to_string(), Value::from(id.as_u64()));
        record
    }

    pub fn id(&self) -> Option<UserId> {
        self.0.get("id").and_then(Value::as_u64).map(UserId)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}
