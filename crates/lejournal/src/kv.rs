// Key-value persistence port

use std::collections::HashMap;
use thiserror::Error;

/// Storage port error taxonomy
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be reached at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write for capacity reasons
    #[error("storage quota exceeded writing key {key}")]
    QuotaExceeded {
        /// Key whose write was refused
        key: String,
    },

    /// A stored value could not be read back intact
    #[error("stored value for key {key} is corrupt: {reason}")]
    Corrupt {
        /// Key whose value is damaged
        key: String,
        /// What went wrong reading it
        reason: String,
    },

    /// Any other backend failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage port operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Key-value persistence port
///
/// The journal serializes its whole event log as one value under one
/// well-known key. Implementations report failures through `Result`; the
/// journal layer absorbs them and keeps operating in memory.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored under `key`
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory key-value store
///
/// The default backend for tests and embedders that handle persistence
/// themselves. The fault-injecting constructor exercises the journal's
/// degraded path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose writes always fail with `Unavailable`
    pub fn failing() -> Self {
        Self {
            entries: HashMap::new(),
            fail_writes: true,
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("write failure injected".to_string()));
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("write failure injected".to_string()));
        }
        self.entries.remove(key);
        Ok(())
    }
}
