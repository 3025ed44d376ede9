//! Durable settings and lifetime stats.

use crate::domain::{AppSettings, UserStats};
use crate::error::Result;
use crate::session::SwipeSession;
use crate::store::{load_json, save_json, KeyValueStore, SETTINGS_KEY, STATS_KEY};

/// In-memory copy of the settings and stats records.
///
/// Every mutation writes the whole record back under its own key. A failed
/// write keeps the in-memory change and returns the error.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    settings: AppSettings,
    stats: UserStats,
    faults: Vec<String>,
}

impl Preferences {
    /// Load both records. A missing record starts from defaults; an
    /// unreadable or corrupt one also starts from defaults and is reported
    /// through [`Preferences::faults`].
    pub fn load<K: KeyValueStore + ?Sized>(store: &K) -> Self {
        let mut faults = Vec::new();
        let settings = load_json::<AppSettings, _>(store, SETTINGS_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default settings: {e}");
                faults.push(e.to_string());
                None
            })
            .unwrap_or_default();
        let stats = load_json::<UserStats, _>(store, STATS_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to empty stats: {e}");
                faults.push(e.to_string());
                None
            })
            .unwrap_or_default();
        Self {
            settings,
            stats,
            faults,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Problems met while loading.
    pub fn faults(&self) -> &[String] {
        &self.faults
    }

    pub fn update_settings<K, F>(&mut self, store: &mut K, edit: F) -> Result<&AppSettings>
    where
        K: KeyValueStore + ?Sized,
        F: FnOnce(&mut AppSettings),
    {
        edit(&mut self.settings);
        if let Err(e) = save_json(store, SETTINGS_KEY, &self.settings) {
            tracing::error!("failed to persist settings: {e}");
            return Err(e);
        }
        tracing::debug!(settings = ?self.settings, "settings saved");
        Ok(&self.settings)
    }

    /// Fold a closed session into the lifetime counters and persist them.
    /// `completed_month` marks a month whose review reached the end.
    pub fn merge_session<K: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut K,
        session: &SwipeSession,
        completed_month: Option<&str>,
    ) -> Result<&UserStats> {
        let stats = &mut self.stats;
        stats.total_photos_reviewed += session.photos_reviewed;
        stats.total_photos_deleted += session.photos_deleted;
        stats.total_space_saved += session.space_saved;
        stats.sessions_completed += 1;
        if let Some(month) = completed_month {
            stats.completed_months.insert(month.to_string());
        }

        if let Err(e) = save_json(store, STATS_KEY, &self.stats) {
            tracing::error!(session = %session.id, "failed to persist stats: {e}");
            return Err(e);
        }
        tracing::info!(
            sessions = self.stats.sessions_completed,
            deleted = self.stats.total_photos_deleted,
            "stats saved"
        );
        Ok(&self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SortOrder;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn session(reviewed: u64, kept: u64, deleted: u64, saved: u64) -> SwipeSession {
        SwipeSession {
            id: "1".to_string(),
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            photos_reviewed: reviewed,
            photos_kept: kept,
            photos_deleted: deleted,
            space_saved: saved,
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let store = MemoryStore::new();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.settings(), &AppSettings::default());
        assert_eq!(prefs.stats(), &UserStats::default());
        assert!(prefs.faults().is_empty());
    }

    #[test]
    fn test_update_settings_persists_whole_record() {
        let mut store = MemoryStore::new();
        let mut prefs = Preferences::load(&store);
        prefs
            .update_settings(&mut store, |s| s.sort_order = SortOrder::MostPhotos)
            .unwrap();
        prefs
            .update_settings(&mut store, |s| s.hide_completed_months = true)
            .unwrap();

        let reloaded = Preferences::load(&store);
        assert_eq!(reloaded.settings().sort_order, SortOrder::MostPhotos);
        assert!(reloaded.settings().hide_completed_months);
        assert!(reloaded.settings().haptic_feedback);
    }

    #[test]
    fn test_update_settings_write_failure() {
        let mut store = MemoryStore::new();
        let mut prefs = Preferences::load(&store);
        store.set_fail_writes(true);

        assert!(prefs
            .update_settings(&mut store, |s| s.haptic_feedback = false)
            .is_err());
        assert!(!prefs.settings().haptic_feedback);
        assert!(Preferences::load(&store).settings().haptic_feedback);
    }

    #[test]
    fn test_merge_is_additive() {
        let mut store = MemoryStore::new();
        let mut prefs = Preferences::load(&store);
        prefs
            .merge_session(&mut store, &session(3, 1, 2, 300), Some("2024-06"))
            .unwrap();
        prefs.merge_session(&mut store, &session(0, 0, 0, 0), None).unwrap();

        let stats = Preferences::load(&store).stats().clone();
        assert_eq!(stats.total_photos_reviewed, 3);
        assert_eq!(stats.total_photos_deleted, 2);
        assert_eq!(stats.total_space_saved, 300);
        assert_eq!(stats.sessions_completed, 2);
        assert!(stats.completed_months.contains("2024-06"));
    }

    #[test]
    fn test_corrupt_stats_fall_back() {
        let mut store = MemoryStore::new();
        store.set(STATS_KEY, "[1,2").unwrap();
        store
            .set(SETTINGS_KEY, "{\"sortOrder\":\"leastRecent\"}")
            .unwrap();

        let prefs = Preferences::load(&store);
        assert_eq!(prefs.stats(), &UserStats::default());
        assert_eq!(prefs.settings().sort_order, SortOrder::LeastRecent);
        assert_eq!(prefs.faults().len(), 1);
    }
}
