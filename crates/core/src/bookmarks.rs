//! Photos set aside for a later look. Independent of review sessions.

use crate::domain::AssetId;
use crate::error::Result;
use crate::store::{load_json, save_json, KeyValueStore, BOOKMARKS_KEY};

/// Ordered set of bookmarked ids, oldest first, persisted on every toggle.
#[derive(Debug, Clone, Default)]
pub struct BookmarkSet {
    ids: Vec<AssetId>,
}

impl BookmarkSet {
    /// Load the persisted set. Unreadable data yields an empty set and the
    /// error, so the caller can report it.
    pub fn load<K: KeyValueStore + ?Sized>(store: &K) -> (Self, Option<String>) {
        match load_json::<Vec<AssetId>, _>(store, BOOKMARKS_KEY) {
            Ok(ids) => {
                let mut set = Self::default();
                for id in ids.unwrap_or_default() {
                    if !set.ids.contains(&id) {
                        set.ids.push(id);
                    }
                }
                (set, None)
            }
            Err(e) => {
                tracing::warn!("falling back to empty bookmarks: {e}");
                (Self::default(), Some(e.to_string()))
            }
        }
    }

    /// Flip membership of `id`. Returns whether it is bookmarked afterwards.
    pub fn toggle<K: KeyValueStore + ?Sized>(&mut self, store: &mut K, id: &str) -> Result<bool> {
        let now_bookmarked = match self.ids.iter().position(|b| b == id) {
            Some(pos) => {
                self.ids.remove(pos);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };
        tracing::debug!(photo = id, bookmarked = now_bookmarked, "bookmark toggled");

        if let Err(e) = save_json(store, BOOKMARKS_KEY, &self.ids) {
            tracing::error!("failed to persist bookmarks: {e}");
            return Err(e);
        }
        Ok(now_bookmarked)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|b| b == id)
    }

    pub fn ids(&self) -> &[AssetId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_toggle_on_and_off() {
        let mut store = MemoryStore::new();
        let (mut set, fault) = BookmarkSet::load(&store);
        assert!(fault.is_none());

        assert!(set.toggle(&mut store, "a").unwrap());
        assert!(set.toggle(&mut store, "b").unwrap());
        assert!(set.contains("a"));
        assert!(!set.toggle(&mut store, "a").unwrap());
        assert!(!set.contains("a"));
        assert_eq!(set.ids(), ["b".to_string()]);
    }

    #[test]
    fn test_persisted_on_every_toggle() {
        let mut store = MemoryStore::new();
        let (mut set, _) = BookmarkSet::load(&store);
        set.toggle(&mut store, "x").unwrap();
        set.toggle(&mut store, "y").unwrap();

        let (reloaded, _) = BookmarkSet::load(&store);
        assert_eq!(reloaded.ids(), ["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_corrupt_record_yields_empty_set() {
        let mut store = MemoryStore::new();
        store.set(BOOKMARKS_KEY, "{\"a\":1}").unwrap();
        let (set, fault) = BookmarkSet::load(&store);
        assert!(set.is_empty());
        assert!(fault.is_some());
    }

    #[test]
    fn test_duplicate_ids_collapse_on_load() {
        let mut store = MemoryStore::new();
        store.set(BOOKMARKS_KEY, "[\"a\",\"a\",\"b\"]").unwrap();
        let (set, _) = BookmarkSet::load(&store);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_write_failure_reports_error() {
        let mut store = MemoryStore::new();
        let (mut set, _) = BookmarkSet::load(&store);
        store.set_fail_writes(true);
        assert!(set.toggle(&mut store, "a").is_err());
        assert!(set.contains("a"));
    }
}
