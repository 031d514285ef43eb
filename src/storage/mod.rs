//! Key-value byte storage backing the entry history and settings.
//!
//! Values are replaced whole on every `set`; there are no partial writes.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const HISTORY_KEY: &str = "reflectflow-mood-history";
pub const SETTINGS_KEY: &str = "reflectflow-settings";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}
