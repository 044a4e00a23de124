pub mod file;
pub mod memory;

use std::path::PathBuf;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::KeyValueStore;
use crate::domain::models::StorageName;

pub type StoreBox = Box<dyn KeyValueStore + Send + Sync>;

pub struct StorageManager {}

impl StorageManager {
    pub fn get(name: StorageName, file_path: PathBuf) -> Result<StoreBox> {
        if name == StorageName::File {
            return Ok(Box::new(file::FileStore::open(file_path)?));
        }

        if name == StorageName::Memory {
            return Ok(Box::<memory::MemoryStore>::default());
        }

        bail!(format!("No storage implemented for {name}"))
    }
}
