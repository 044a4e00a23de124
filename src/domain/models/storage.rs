use anyhow::Result;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StorageName {
    File,
    Memory,
}

impl StorageName {
    pub fn parse(text: String) -> Option<StorageName> {
        return StorageName::iter().find(|e| return e.to_string() == text);
    }
}

/// Keys written to durable storage for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StorageKey {
    SessionUid,
    SessionSid,
    SessionLogin,
    CsrfToken,
}

/// Durable string key-value store, the equivalent of a browser's local
/// storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that doesn't exist is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}
