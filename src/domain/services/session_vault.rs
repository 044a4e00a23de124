#[cfg(test)]
#[path = "session_vault_test.rs"]
mod tests;

use anyhow::Result;
use strum::IntoEnumIterator;

use crate::domain::models::SessionState;
use crate::domain::models::StorageKey;
use crate::infrastructure::storage::StoreBox;

/// Sole owner of the durable store. Everything that reads or writes session
/// keys goes through here.
pub struct SessionVault {
    store: StoreBox,
}

impl SessionVault {
    pub fn new(store: StoreBox) -> SessionVault {
        return SessionVault { store };
    }

    fn get(&self, key: StorageKey) -> Option<String> {
        return self
            .store
            .get(&key.to_string())
            .filter(|val| return !val.is_empty());
    }

    fn put(&mut self, key: StorageKey, value: &Option<String>) -> Result<()> {
        if let Some(val) = value {
            return self.store.set(&key.to_string(), val);
        }

        return self.store.remove(&key.to_string());
    }

    pub fn hydrate(&self) -> SessionState {
        let uid = self
            .get(StorageKey::SessionUid)
            .and_then(|val| return val.parse::<i64>().ok());

        return SessionState {
            uid,
            session_id: self.get(StorageKey::SessionSid),
            login: self.get(StorageKey::SessionLogin),
            csrf_token: self.get(StorageKey::CsrfToken),
        };
    }

    /// Writes all four keys. A failed write clears every key so storage
    /// never holds a partial session.
    pub fn persist(&mut self, state: &SessionState) -> Result<()> {
        if let Err(err) = self.write_all(state) {
            if let Err(clear_err) = self.clear() {
                tracing::error!(error = ?clear_err, "Failed to roll back partial session write");
            }
            return Err(err);
        }

        return Ok(());
    }

    fn write_all(&mut self, state: &SessionState) -> Result<()> {
        self.put(
            StorageKey::SessionUid,
            &state.uid.map(|uid| return uid.to_string()),
        )?;
        self.put(StorageKey::SessionSid, &state.session_id)?;
        self.put(StorageKey::SessionLogin, &state.login)?;
        self.put(StorageKey::CsrfToken, &state.csrf_token)?;

        return Ok(());
    }

    pub fn persist_csrf_token(&mut self, token: &str) -> Result<()> {
        return self.store.set(&StorageKey::CsrfToken.to_string(), token);
    }

    pub fn clear(&mut self) -> Result<()> {
        for key in StorageKey::iter() {
            self.store.remove(&key.to_string())?;
        }

        return Ok(());
    }
}
