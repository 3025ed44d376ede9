pub mod bookmarks;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod hasher;
pub mod paywall;
pub mod prefs;
pub mod reconcile;
pub mod session;
pub mod source;
pub mod storage_alert;
pub mod store;

use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};

use bookmarks::BookmarkSet;
use catalog::{PhotoCatalog, RefreshProgress};
use config::EngineConfig;
use domain::*;
use error::{Error, Result};
use paywall::PaywallGate;
use prefs::Preferences;
use reconcile::FlushOutcome;
use session::{SessionEngine, SessionOutcome, SwipeHistoryItem, SwipeSession};
use source::{AssetSource, DirectoryAssetSource};
use storage_alert::{Notifier, StorageCheck, StorageMonitor, StorageProbe};
use store::{KeyValueStore, SqliteStore};

/// What one keep/delete decision did.
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub photo_id: AssetId,
    pub action: SwipeAction,
    /// Bytes added to the session's `space_saved`.
    pub size: u64,
    /// The queue has no photos left.
    pub exhausted: bool,
    /// The upgrade interstitial is due.
    pub show_paywall: bool,
}

/// Result of ending a review.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session: SwipeSession,
    pub outcome: SessionOutcome,
    pub flush: FlushOutcome,
    /// False when the stats write failed; the in-memory totals still include
    /// this session.
    pub stats_persisted: bool,
    /// Month marked as completed by this session.
    pub completed_month: Option<String>,
}

/// The main entry point for the Swipeaway library.
///
/// Owns the catalog, the one review session, and the durable records, and
/// drives them against an [`AssetSource`] and a [`KeyValueStore`].
pub struct Swipeaway<S: AssetSource, K: KeyValueStore> {
    source: S,
    store: K,
    config: EngineConfig,
    catalog: PhotoCatalog,
    engine: SessionEngine,
    mode: Option<ReviewMode>,
    prefs: Preferences,
    bookmarks: BookmarkSet,
    paywall: PaywallGate,
    premium: bool,
    load_faults: Vec<String>,
}

impl Swipeaway<DirectoryAssetSource, SqliteStore> {
    /// Open a photo directory with its state database.
    pub fn open(
        library: &Path,
        state_db: &Path,
        config: EngineConfig,
        offset: FixedOffset,
    ) -> Result<Self> {
        let source = DirectoryAssetSource::open(library, offset)?;
        let store = SqliteStore::open(state_db)?;
        Ok(Self::new(source, store, config, offset))
    }
}

impl<S: AssetSource, K: KeyValueStore> Swipeaway<S, K> {
    /// Wire the components together and load the durable records. Corrupt
    /// records fall back to defaults and show up in [`Swipeaway::faults`].
    pub fn new(source: S, store: K, config: EngineConfig, offset: FixedOffset) -> Self {
        let prefs = Preferences::load(&store);
        let (bookmarks, bookmark_fault) = BookmarkSet::load(&store);
        let mut load_faults = prefs.faults().to_vec();
        load_faults.extend(bookmark_fault);

        Self {
            engine: SessionEngine::new(config.size_estimate.clone()),
            paywall: PaywallGate::new(config.paywall_interval),
            catalog: PhotoCatalog::new(offset),
            source,
            store,
            config,
            mode: None,
            prefs,
            bookmarks,
            premium: false,
            load_faults,
        }
    }

    // ── Library ──────────────────────────────────────────────────────

    /// Rebuild the catalog from the asset source.
    ///
    /// Refused while a review is open: the session's pending deletions have
    /// to be reconciled before the catalog is rebuilt.
    pub fn refresh_library(
        &mut self,
        progress_cb: Option<&mut dyn FnMut(RefreshProgress)>,
    ) -> Result<usize> {
        if self.engine.is_open() {
            return Err(Error::SessionAlreadyActive);
        }
        self.catalog.refresh(&mut self.source, &self.config, progress_cb)
    }

    pub fn permission(&self) -> PermissionLevel {
        self.source.permission_level()
    }

    /// Fails with [`Error::PermissionInsufficient`] unless deletions can
    /// actually be carried out.
    pub fn ensure_delete_permission(&self) -> Result<()> {
        match self.permission() {
            PermissionLevel::Full => Ok(()),
            level => Err(Error::PermissionInsufficient(level)),
        }
    }

    pub fn catalog(&self) -> &PhotoCatalog {
        &self.catalog
    }

    pub fn month(&self, id: &str) -> Result<&MonthGroup> {
        self.catalog
            .find(id)
            .ok_or_else(|| Error::UnknownMonth(id.to_string()))
    }

    /// Month groups as the home screen shows them: sorted and filtered by
    /// the current settings.
    pub fn visible_months(&self) -> Vec<&MonthGroup> {
        self.catalog
            .visible_groups(self.prefs.settings(), &self.prefs.stats().completed_months)
    }

    pub fn is_month_completed(&self, id: &str) -> bool {
        self.prefs.stats().completed_months.contains(id)
    }

    // ── Review ───────────────────────────────────────────────────────

    /// Build the queue for `mode` and open a session over it.
    pub fn start_review(&mut self, mode: ReviewMode) -> Result<&SwipeSession> {
        if self.engine.is_open() {
            tracing::warn!(?mode, "review already in progress");
            return Err(Error::SessionAlreadyActive);
        }
        let queue = catalog::queue::build_queue(&self.catalog, &mode);
        self.mode = Some(mode);
        self.engine.start(queue)
    }

    /// Read access to the open session: current photo, progress, history.
    pub fn review(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn review_mode(&self) -> Option<&ReviewMode> {
        self.mode.as_ref()
    }

    /// Keep or delete the current photo. `None` when there is no session or
    /// nothing left to decide.
    pub fn decide(&mut self, action: SwipeAction) -> Option<SwipeOutcome> {
        let item = self.engine.decide(action)?;
        let photo_id = item.photo.id.clone();
        let size = item.size;
        let show_paywall = self.paywall.record_swipe(self.premium);
        Some(SwipeOutcome {
            photo_id,
            action,
            size,
            exhausted: self.engine.is_exhausted(),
            show_paywall,
        })
    }

    pub fn undo(&mut self) -> Option<SwipeHistoryItem> {
        self.engine.undo()
    }

    /// End the open review: delete what was marked, prune the catalog and
    /// fold the counters into the lifetime stats.
    ///
    /// Returns `None` when no review is open, so a repeated call never
    /// counts a session twice.
    pub fn end_review(&mut self) -> Option<SessionSummary> {
        let closed = self.engine.close()?;
        let mode = self.mode.take();

        let flush = reconcile::flush(&mut self.source, &mut self.catalog, &closed.pending_deletions);

        let completed_month = match (&mode, closed.outcome) {
            (Some(ReviewMode::Month(id)), SessionOutcome::Exhausted)
                if closed.session.photos_reviewed > 0 =>
            {
                Some(id.clone())
            }
            _ => None,
        };
        let stats_persisted = self
            .prefs
            .merge_session(&mut self.store, &closed.session, completed_month.as_deref())
            .is_ok();

        Some(SessionSummary {
            session: closed.session,
            outcome: closed.outcome,
            flush,
            stats_persisted,
            completed_month,
        })
    }

    // ── Bookmarks ────────────────────────────────────────────────────

    pub fn toggle_bookmark(&mut self, id: &str) -> Result<bool> {
        self.bookmarks.toggle(&mut self.store, id)
    }

    /// Bookmark or un-bookmark the photo under the review cursor. Session
    /// counters and history are untouched.
    pub fn toggle_current_bookmark(&mut self) -> Result<bool> {
        let id = self
            .engine
            .current()
            .map(|p| p.id.clone())
            .ok_or(Error::NoActiveSession)?;
        self.bookmarks.toggle(&mut self.store, &id)
    }

    pub fn bookmarks(&self) -> &BookmarkSet {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarks.contains(id)
    }

    /// Bookmarked photos still present in the catalog, in bookmark order.
    pub fn bookmarked_photos(&self) -> Vec<&PhotoAsset> {
        self.bookmarks
            .ids()
            .iter()
            .filter_map(|id| self.catalog.photo(id))
            .collect()
    }

    // ── Settings & stats ─────────────────────────────────────────────

    pub fn settings(&self) -> &AppSettings {
        self.prefs.settings()
    }

    pub fn update_settings<F: FnOnce(&mut AppSettings)>(&mut self, edit: F) -> Result<&AppSettings> {
        self.prefs.update_settings(&mut self.store, edit)
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Result<()> {
        self.update_settings(|s| s.sort_order = order).map(|_| ())
    }

    pub fn set_hide_completed_months(&mut self, hide: bool) -> Result<()> {
        self.update_settings(|s| s.hide_completed_months = hide).map(|_| ())
    }

    pub fn set_haptic_feedback(&mut self, enabled: bool) -> Result<()> {
        self.update_settings(|s| s.haptic_feedback = enabled).map(|_| ())
    }

    pub fn stats(&self) -> &UserStats {
        self.prefs.stats()
    }

    // ── Entitlement & storage ────────────────────────────────────────

    pub fn set_premium(&mut self, premium: bool) {
        self.premium = premium;
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    pub fn check_storage<P, N>(
        &mut self,
        probe: &P,
        notifier: &mut N,
        now: DateTime<Utc>,
    ) -> Result<StorageCheck>
    where
        P: StorageProbe + ?Sized,
        N: Notifier + ?Sized,
    {
        StorageMonitor::new(self.config.storage.clone()).check(&mut self.store, probe, notifier, now)
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Recoverable problems: records that could not be loaded and the last
    /// failed catalog refresh.
    pub fn faults(&self) -> Vec<String> {
        let mut faults = self.load_faults.clone();
        if let Some(err) = self.catalog.last_refresh_error() {
            faults.push(format!("library refresh failed: {err}"));
        }
        faults
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }
}
