//! Device-local key/value storage.
//!
//! Everything that must survive between runs on the same device (the trending cache, the chat
//! configuration) goes through [`KeyValueStore`], so the logic above it never depends on the
//! storage medium.
mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage location unavailable: {0}")]
    Location(String),
}

/// Persistent string storage addressed by key
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if there is none
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing a missing key is not an error
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}
