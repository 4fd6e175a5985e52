use parking_lot::RwLock;
use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::error::StorageError;

// 1. KeyValueStore Contract
/// KeyValueStore
///
/// The durable key-value storage the session record lives in. Values are opaque
/// strings and every write replaces the whole value under the key.
///
/// The calls are synchronous: logout must complete without suspending, and the
/// backing stores (local file, memory) never block for long.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` when nothing is stored.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// KeyValueState
///
/// The concrete type used to share the key-value store with the session store.
pub type KeyValueState = Arc<dyn KeyValueStore>;

// 2. The Real Implementation (local files)
/// FileKeyValueStore
///
/// Keeps one `<key>.json` file per key inside a directory. Writes go to a
/// temporary sibling first and are renamed into place, so a reader never sees a
/// half-written record.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(key, source)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|source| io_error(key, source))?;

        let staging = self.root.join(format!("{key}.json.tmp"));
        fs::write(&staging, value).map_err(|source| io_error(key, source))?;
        fs::rename(&staging, &path).map_err(|source| io_error(key, source))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(key, source)),
        }
    }
}

fn io_error(key: &str, source: io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

/// validate_key
///
/// Keys become file names, so anything that could navigate the filesystem is
/// rejected rather than rewritten.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let well_formed = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if well_formed {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// 3. The In-Memory Implementation (tests, ephemeral sessions)
/// MemoryKeyValueStore
///
/// Map-backed store. `new_failing` builds one that rejects every operation, to
/// exercise the failure paths of the session store; `set_failing` flips that
/// mode on a shared instance.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RwLock<HashMap<String, String>>,
    /// When true, all operations return a simulated failure.
    should_fail: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    /// Seeds a raw value, e.g. a corrupt session record.
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items.write().insert(key.to_string(), value.to_string());
        self
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.should_fail.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable(
                "Mock Storage Error: Simulation requested".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.write().remove(key);
        Ok(())
    }
}
