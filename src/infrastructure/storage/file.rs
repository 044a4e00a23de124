#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::domain::models::KeyValueStore;

/// Stores entries as a flat JSON object on disk. The whole file is rewritten
/// on every mutation.
pub struct FileStore {
    pub file_path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(file_path: PathBuf) -> Result<FileStore> {
        let mut entries = BTreeMap::new();
        if file_path.exists() {
            let contents = fs::read_to_string(&file_path)?;
            if !contents.trim().is_empty() {
                entries = serde_json::from_str(&contents)?;
            }
        }

        return Ok(FileStore { file_path, entries });
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.file_path, payload)?;

        return Ok(());
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        return self.entries.get(key).cloned();
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        return self.flush();
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }

        return self.flush();
    }
}
