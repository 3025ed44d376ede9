//! Durable key-value persistence.
//!
//! Settings, stats, bookmarks and the storage-alert cooldown each live under
//! their own key as a JSON string. [`SqliteStore`] is the on-disk backend;
//! [`MemoryStore`] backs tests and ephemeral runs.

pub mod schema;
pub mod sqlite;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

pub use sqlite::SqliteStore;

pub const SETTINGS_KEY: &str = "@swipeaway_settings";
pub const STATS_KEY: &str = "@swipeaway_stats";
pub const BOOKMARKS_KEY: &str = "@swipeaway_bookmarks";
pub const LAST_STORAGE_ALERT_KEY: &str = "@swipeaway_last_storage_alert";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Read and decode the JSON record under `key`. `Ok(None)` when absent.
pub fn load_json<T, K>(store: &K, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    K: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| Error::CorruptRecord {
            key: key.to_string(),
            source,
        })
}

pub fn save_json<T, K>(store: &mut K, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    K: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// `HashMap`-backed store. Writes can be made to fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` return an IO error.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Io(std::io::Error::other("write refused")));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AppSettings;

    #[test]
    fn test_memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_write_failure() {
        let mut store = MemoryStore::new();
        store.set("k", "old").unwrap();
        store.set_fail_writes(true);
        assert!(store.set("k", "new").is_err());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        let settings = AppSettings {
            hide_completed_months: true,
            ..AppSettings::default()
        };
        save_json(&mut store, SETTINGS_KEY, &settings).unwrap();
        let loaded: Option<AppSettings> = load_json(&store, SETTINGS_KEY).unwrap();
        assert_eq!(loaded, Some(settings));

        let missing: Option<AppSettings> = load_json(&store, STATS_KEY).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_corrupt_record() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, "{not json").unwrap();
        let err = load_json::<AppSettings, _>(&store, SETTINGS_KEY).unwrap_err();
        match err {
            Error::CorruptRecord { key, .. } => assert_eq!(key, SETTINGS_KEY),
            other => panic!("unexpected error: {other}"),
        }
    }
}
