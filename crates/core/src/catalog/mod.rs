pub mod queue;

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::EngineConfig;
use crate::domain::*;
use crate::error::Result;
use crate::source::AssetSource;

/// Progress events emitted while the catalog pages through its source.
pub enum RefreshProgress {
    /// A page arrived; `fetched` is the running total.
    PageLoaded { fetched: usize },
    /// Enumeration finished and the groups were rebuilt.
    Complete { photos: usize, months: usize },
}

/// In-memory, month-grouped view of every asset believed to exist.
///
/// Groups are kept in canonical order (newest month first) and never empty.
/// A failed refresh keeps the previous groups and records the failure.
pub struct PhotoCatalog {
    groups: Vec<MonthGroup>,
    offset: FixedOffset,
    refreshed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    truncated: bool,
}

impl PhotoCatalog {
    /// Empty catalog that buckets by calendar dates in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            groups: Vec::new(),
            offset,
            refreshed_at: None,
            last_error: None,
            truncated: false,
        }
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    /// Rebuild the groups from `source`, pulling at most `config.max_assets`.
    /// Returns the number of photos now in the catalog.
    pub fn refresh<S: AssetSource + ?Sized>(
        &mut self,
        source: &mut S,
        config: &EngineConfig,
        mut progress_cb: Option<&mut dyn FnMut(RefreshProgress)>,
    ) -> Result<usize> {
        match fetch_capped(source, config, &mut progress_cb) {
            Ok((photos, truncated)) => {
                let count = photos.len();
                self.groups = group_by_month(photos, &self.offset);
                self.truncated = truncated;
                self.refreshed_at = Some(Utc::now());
                self.last_error = None;
                tracing::info!(photos = count, months = self.groups.len(), truncated, "catalog refreshed");
                if let Some(ref mut cb) = progress_cb {
                    cb(RefreshProgress::Complete {
                        photos: count,
                        months: self.groups.len(),
                    });
                }
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(%err, "catalog refresh failed, keeping previous state");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Drop every photo whose id is in `ids`, and any month left empty.
    /// Unknown ids are ignored. Returns how many photos were removed.
    pub fn remove_assets(&mut self, ids: &HashSet<AssetId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let removed: usize = self.groups.iter_mut().map(|g| g.retain_except(ids)).sum();
        self.groups.retain(|g| g.photo_count > 0);
        removed
    }

    /// Month groups in canonical order.
    pub fn groups(&self) -> &[MonthGroup] {
        &self.groups
    }

    pub fn find(&self, month_id: &str) -> Option<&MonthGroup> {
        self.groups.iter().find(|g| g.id == month_id)
    }

    /// Groups re-sorted for display. Count sorts are stable, so equal counts
    /// keep recency order.
    pub fn sorted(&self, order: SortOrder) -> Vec<&MonthGroup> {
        let mut groups: Vec<&MonthGroup> = self.groups.iter().collect();
        match order {
            SortOrder::MostRecent => {}
            SortOrder::LeastRecent => groups.reverse(),
            SortOrder::MostPhotos => groups.sort_by(|a, b| b.photo_count.cmp(&a.photo_count)),
            SortOrder::FewestPhotos => groups.sort_by(|a, b| a.photo_count.cmp(&b.photo_count)),
        }
        groups
    }

    /// Groups as the month list shows them: sorted per `settings`, with
    /// completed months hidden when the user asked for that.
    pub fn visible_groups(
        &self,
        settings: &AppSettings,
        completed: &BTreeSet<String>,
    ) -> Vec<&MonthGroup> {
        let mut groups = self.sorted(settings.sort_order);
        if settings.hide_completed_months {
            groups.retain(|g| !completed.contains(&g.id));
        }
        groups
    }

    pub fn all_photos(&self) -> impl Iterator<Item = &PhotoAsset> {
        self.groups.iter().flat_map(|g| g.photos.iter())
    }

    pub fn total_photo_count(&self) -> usize {
        self.groups.iter().map(|g| g.photo_count).sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.photo(id).is_some()
    }

    pub fn photo(&self, id: &str) -> Option<&PhotoAsset> {
        self.all_photos().find(|p| p.id == id)
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Error message of the last refresh, if it failed.
    pub fn last_refresh_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True when the last refresh failed and the groups may be out of date.
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }

    /// True when the last refresh stopped at the asset cap.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Page through `source` until it is exhausted or the cap is hit.
/// Ids seen on an earlier page are skipped.
fn fetch_capped<S: AssetSource + ?Sized>(
    source: &mut S,
    config: &EngineConfig,
    progress_cb: &mut Option<&mut dyn FnMut(RefreshProgress)>,
) -> Result<(Vec<PhotoAsset>, bool)> {
    let mut photos: Vec<PhotoAsset> = Vec::new();
    let mut seen: HashSet<AssetId> = HashSet::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source.list_page(config.page_size, cursor.as_deref())?;
        for asset in page.assets {
            if seen.insert(asset.id.clone()) {
                photos.push(asset);
            }
        }

        if let Some(ref mut cb) = progress_cb {
            cb(RefreshProgress::PageLoaded {
                fetched: photos.len(),
            });
        }

        if photos.len() >= config.max_assets {
            let truncated = photos.len() > config.max_assets || page.has_more;
            photos.truncate(config.max_assets);
            return Ok((photos, truncated));
        }
        if !page.has_more || page.next_cursor.is_none() {
            return Ok((photos, false));
        }
        cursor = page.next_cursor;
    }
}

/// Bucket photos by calendar month, newest month first. Photos keep their
/// input order within a month.
pub fn group_by_month(photos: Vec<PhotoAsset>, offset: &FixedOffset) -> Vec<MonthGroup> {
    let mut groups: HashMap<(i32, u32), MonthGroup> = HashMap::new();
    for photo in photos {
        let (year, month) = photo.month_key(offset);
        groups
            .entry((year, month))
            .or_insert_with(|| MonthGroup::new(year, month))
            .push(photo);
    }

    let mut groups: Vec<MonthGroup> = groups.into_values().collect();
    groups.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
    groups
}
