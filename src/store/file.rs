use std::{
    fs::{File, create_dir_all},
    io::Write,
    path::PathBuf,
};

use percent_encoding::{NON_ALPHANUMERIC, percent_encode};
use tracing::{debug, info};

use super::{KeyValueStore, StoreError};

/// One JSON document per key, stored as files inside a cache directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform cache directory, e.g. `~/.cache/promptdeck`
    pub fn default_location() -> Result<Self, StoreError> {
        dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
            .map(|cache| Self::new(cache.join("promptdeck")))
            .ok_or_else(|| StoreError::Location("Cache directory not found".to_string()))
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Keys are percent-encoded so any key maps to a single safe file name
    fn path_for(&self, key: &str) -> PathBuf {
        let encoded = percent_encode(key.as_bytes(), NON_ALPHANUMERIC);
        self.dir.join(format!("{}.json", encoded))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(?path, "Entry not found");
            return Ok(None);
        }

        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let mut file = File::create(&path)?;
        file.write_all(value.as_bytes())?;
        debug!(?path, "Entry saved");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
            info!(?path, "Entry deleted");
        } else {
            debug!(?path, "Entry not found; skipping deletion.");
        }
        Ok(())
    }
}
