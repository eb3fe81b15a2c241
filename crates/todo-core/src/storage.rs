use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::PersistenceError;

/// Synchronous string key-value storage, scoped to one origin or profile.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&self, key: &str, raw: &str) -> Result<(), PersistenceError>;
}

pub type SharedStore = Rc<dyn KeyValueStore>;

/// Reads `key` as JSON, substituting `default` on a miss, a read failure or
/// a malformed value. Never writes.
#[tracing::instrument(skip(store, default))]
pub fn load_or<T, F>(store: &dyn KeyValueStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no stored value; using default");
            return default();
        }
        Err(error) => {
            warn!(%error, "failed reading stored value; using default");
            return default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "ignoring malformed stored value");
            default()
        }
    }
}

#[tracing::instrument(skip(store, value))]
pub fn save<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string(value).map_err(|source| PersistenceError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.write(key, &raw)?;
    debug!(bytes = raw.len(), "wrote stored value");
    Ok(())
}

/// One value mirrored in memory and written through to a [`KeyValueStore`].
pub struct Persisted<T> {
    store: SharedStore,
    key: String,
    value: T,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn load(store: SharedStore, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        let value = load_or(store.as_ref(), &key, || initial);
        Self { store, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value. A failed write leaves the new value in memory.
    pub fn set(&mut self, value: T) {
        self.value = value;
        if let Err(error) = save(self.store.as_ref(), &self.key, &self.value) {
            warn!(key = %self.key, %error, "write-through failed; keeping in-memory value");
        }
    }

    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// In-process store. With a quota, writes that would push the total size of
/// keys and values past the limit are rejected like a full `localStorage`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota: Some(limit),
        }
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Seeds a raw value without going through serialization.
    pub fn insert_raw(&self, key: &str, raw: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), raw.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, raw: &str) -> Result<(), PersistenceError> {
        if let Some(limit) = self.quota {
            let needed = self.used_without(key) + key.len() + raw.len();
            if needed > limit {
                return Err(PersistenceError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.insert_raw(key, raw);
        Ok(())
    }
}

/// Directory-backed store holding one `<key>.json` file per key.
#[derive(Debug)]
pub struct FileStore {
    pub dir: PathBuf,
}

impl FileStore {
    #[tracing::instrument(skip(dir))]
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let dir = dir.to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        info!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| PersistenceError::Backend {
                key: key.to_string(),
                message: format!("failed reading {}: {err}", path.display()),
            })
    }

    #[tracing::instrument(skip(self, raw))]
    fn write(&self, key: &str, raw: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        let backend = |message: String| PersistenceError::Backend {
            key: key.to_string(),
            message,
        };

        let mut temp =
            NamedTempFile::new_in(&self.dir).map_err(|err| backend(err.to_string()))?;
        temp.write_all(raw.as_bytes())
            .and_then(|()| temp.flush())
            .map_err(|err| backend(err.to_string()))?;
        temp.persist(&path)
            .map_err(|err| backend(format!("failed to persist {}: {err}", path.display())))?;

        debug!(file = %path.display(), bytes = raw.len(), "saved key atomically");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{KeyValueStore, MemoryStore, Persisted, SharedStore, load_or};

    #[test]
    fn missing_and_malformed_values_fall_back_without_writing() {
        let store = MemoryStore::shared();
        store.insert_raw("broken", "{not json");

        let missing: Vec<u32> = load_or(store.as_ref(), "absent", || vec![7]);
        let broken: Vec<u32> = load_or(store.as_ref(), "broken", Vec::new);

        assert_eq!(missing, vec![7]);
        assert!(broken.is_empty());
        assert_eq!(store.raw("absent"), None);
        assert_eq!(store.raw("broken").as_deref(), Some("{not json"));
    }

    #[test]
    fn set_and_update_write_through() {
        let store = MemoryStore::shared();
        let shared: SharedStore = store.clone();
        let mut counter = Persisted::load(shared, "counter", 0_u32);
        assert_eq!(store.raw("counter"), None);

        counter.set(3);
        assert_eq!(store.raw("counter").as_deref(), Some("3"));

        counter.update(|prev| prev + 1);
        assert_eq!(*counter.get(), 4);
        assert_eq!(store.raw("counter").as_deref(), Some("4"));
    }

    #[test]
    fn existing_value_is_read_once_at_load() {
        let store = MemoryStore::shared();
        store.insert_raw("name", "\"stored\"");
        let shared: SharedStore = store.clone();
        let name = Persisted::load(shared, "name", "fallback".to_string());

        store.insert_raw("name", "\"changed behind our back\"");
        assert_eq!(name.get(), "stored");
    }

    #[test]
    fn quota_failure_keeps_in_memory_value() {
        let store = Rc::new(MemoryStore::with_quota(16));
        let shared: SharedStore = store.clone();
        let mut text = Persisted::load(shared, "k", String::new());

        text.set("short".to_string());
        assert_eq!(store.raw("k").as_deref(), Some("\"short\""));

        text.set("a value far too long for the quota".to_string());
        assert_eq!(text.get(), "a value far too long for the quota");
        assert_eq!(store.raw("k").as_deref(), Some("\"short\""));
        assert!(store.write("k", &"x".repeat(32)).is_err());
    }
}
