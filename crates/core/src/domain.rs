use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::SizeEstimate;

/// Stable identifier of an asset within the device library.
pub type AssetId = String;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

/// Immutable metadata record for one photo or video, as handed out by an
/// [`AssetSource`](crate::source::AssetSource).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAsset {
    pub id: AssetId,
    /// Opaque locator, only meaningful to the source that produced it.
    pub uri: String,
    pub filename: String,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
    /// Epoch milliseconds.
    pub creation_time: i64,
    /// Epoch milliseconds.
    pub modification_time: i64,
    /// Size on disk in bytes, when the source knows it.
    pub file_size: Option<u64>,
    /// Video duration in seconds.
    pub duration: Option<f64>,
}

impl PhotoAsset {
    /// Creation time in the given offset. Out-of-range timestamps clamp to the epoch.
    pub fn created_at(&self, offset: &FixedOffset) -> DateTime<FixedOffset> {
        DateTime::from_timestamp_millis(self.creation_time)
            .unwrap_or_default()
            .with_timezone(offset)
    }

    pub fn created_on(&self, offset: &FixedOffset) -> NaiveDate {
        self.created_at(offset).date_naive()
    }

    /// `(year, month)` bucket the asset falls into, with a 1-based month.
    pub fn month_key(&self, offset: &FixedOffset) -> (i32, u32) {
        let date = self.created_on(offset);
        (date.year(), date.month())
    }

    /// Bytes this asset is assumed to occupy.
    ///
    /// Uses the known file size when present, otherwise estimates from the
    /// pixel dimensions, otherwise falls back to a flat constant.
    pub fn effective_size(&self, estimate: &SizeEstimate) -> u64 {
        if let Some(size) = self.file_size {
            return size;
        }
        if self.width > 0 && self.height > 0 && estimate.compression_ratio > 0 {
            let pixels = self.width as u64 * self.height as u64;
            return pixels.saturating_mul(estimate.bytes_per_pixel) / estimate.compression_ratio;
        }
        estimate.fallback_bytes
    }
}

/// Composite `year-month` key, e.g. `2024-06`.
pub fn month_id(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Human label, e.g. `Jun 2024`.
pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???");
    format!("{name} {year}")
}

/// All photos created within one calendar month.
///
/// `photo_count` always equals `photos.len()` and is never zero for a group
/// surfaced by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGroup {
    pub id: String,
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub photo_count: usize,
    pub photos: Vec<PhotoAsset>,
}

impl MonthGroup {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            id: month_id(year, month),
            label: month_label(year, month),
            year,
            month,
            photo_count: 0,
            photos: Vec::new(),
        }
    }

    pub fn push(&mut self, photo: PhotoAsset) {
        self.photos.push(photo);
        self.photo_count = self.photos.len();
    }

    /// Drops every photo whose id is in `ids`. Returns how many were removed.
    pub fn retain_except(&mut self, ids: &std::collections::HashSet<AssetId>) -> usize {
        let before = self.photos.len();
        self.photos.retain(|p| !ids.contains(&p.id));
        self.photo_count = self.photos.len();
        before - self.photo_count
    }

    pub fn total_size(&self, estimate: &SizeEstimate) -> u64 {
        self.photos.iter().map(|p| p.effective_size(estimate)).sum()
    }
}

/// Terminal decision for one reviewed photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Keep,
    Delete,
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwipeAction::Keep => f.write_str("keep"),
            SwipeAction::Delete => f.write_str("delete"),
        }
    }
}

/// How a review queue is derived from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewMode {
    /// The most recent month, in source order.
    Recents,
    /// Every photo, freshly shuffled.
    Random,
    /// One month group by id.
    Month(String),
    /// Photos whose calendar month and day match the given date, any year.
    OnThisDay(NaiveDate),
    /// Every photo in canonical order.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    MostRecent,
    LeastRecent,
    MostPhotos,
    FewestPhotos,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::MostRecent => "most-recent",
            SortOrder::LeastRecent => "least-recent",
            SortOrder::MostPhotos => "most-photos",
            SortOrder::FewestPhotos => "fewest-photos",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "most-recent" | "mostRecent" => Ok(SortOrder::MostRecent),
            "least-recent" | "leastRecent" => Ok(SortOrder::LeastRecent),
            "most-photos" | "mostPhotos" => Ok(SortOrder::MostPhotos),
            "fewest-photos" | "fewestPhotos" => Ok(SortOrder::FewestPhotos),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// User preferences. Persisted as one JSON record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub has_completed_onboarding: bool,
    pub has_granted_photo_permission: bool,
    pub sort_order: SortOrder,
    pub hide_completed_months: bool,
    pub haptic_feedback: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            has_completed_onboarding: false,
            has_granted_photo_permission: false,
            sort_order: SortOrder::MostRecent,
            hide_completed_months: false,
            haptic_feedback: true,
        }
    }
}

/// Lifetime counters accumulated across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_photos_reviewed: u64,
    pub total_photos_deleted: u64,
    pub total_space_saved: u64,
    pub sessions_completed: u64,
    /// Month ids fully swiped through in a month review.
    pub completed_months: BTreeSet<String>,
}

/// Access level the user granted to the photo library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    None,
    Limited,
    Full,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::None => f.write_str("none"),
            PermissionLevel::Limited => f.write_str("limited"),
            PermissionLevel::Full => f.write_str("full"),
        }
    }
}

/// One page of an asset enumeration.
#[derive(Debug, Clone, Default)]
pub struct AssetPage {
    pub assets: Vec<PhotoAsset>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[cfg(test)]
pub(crate) fn test_asset(id: &str, creation_time: i64, file_size: Option<u64>) -> PhotoAsset {
    PhotoAsset {
        id: id.to_string(),
        uri: format!("mem://{id}"),
        filename: format!("{id}.jpg"),
        media_type: MediaType::Photo,
        width: 4032,
        height: 3024,
        creation_time,
        modification_time: creation_time,
        file_size,
        duration: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_month_id_and_label() {
        assert_eq!(month_id(2024, 6), "2024-06");
        assert_eq!(month_label(2024, 6), "Jun 2024");
        assert_eq!(month_label(1999, 12), "Dec 1999");
    }

    #[test]
    fn test_month_key_respects_offset() {
        // 2024-07-01T00:30:00Z is still June in UTC-1.
        let asset = test_asset("a", 1_719_793_800_000, None);
        assert_eq!(asset.month_key(&utc()), (2024, 7));
        let west = FixedOffset::west_opt(3600).unwrap();
        assert_eq!(asset.month_key(&west), (2024, 6));
    }

    #[test]
    fn test_effective_size_prefers_known_size() {
        let asset = test_asset("a", 0, Some(1234));
        assert_eq!(asset.effective_size(&SizeEstimate::default()), 1234);
    }

    #[test]
    fn test_effective_size_estimates_from_dimensions() {
        let asset = test_asset("a", 0, None);
        // 4032 * 3024 * 3 / 10
        assert_eq!(asset.effective_size(&SizeEstimate::default()), 3_657_830);
    }

    #[test]
    fn test_effective_size_saturates_on_huge_inputs() {
        let mut asset = test_asset("a", 0, None);
        asset.width = u32::MAX;
        asset.height = u32::MAX;
        let estimate = SizeEstimate {
            bytes_per_pixel: u64::MAX,
            compression_ratio: 1,
            ..SizeEstimate::default()
        };
        assert_eq!(asset.effective_size(&estimate), u64::MAX);
    }

    #[test]
    fn test_effective_size_fallback_without_dimensions() {
        let mut asset = test_asset("a", 0, None);
        asset.width = 0;
        assert_eq!(asset.effective_size(&SizeEstimate::default()), 2_000_000);
    }

    #[test]
    fn test_month_group_count_tracks_photos() {
        let mut group = MonthGroup::new(2024, 6);
        group.push(test_asset("a", 0, None));
        group.push(test_asset("b", 0, None));
        assert_eq!(group.photo_count, 2);

        let ids = ["a".to_string()].into_iter().collect();
        assert_eq!(group.retain_except(&ids), 1);
        assert_eq!(group.photo_count, 1);
        assert_eq!(group.photos[0].id, "b");
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("most-photos".parse::<SortOrder>().unwrap(), SortOrder::MostPhotos);
        assert_eq!("leastRecent".parse::<SortOrder>().unwrap(), SortOrder::LeastRecent);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_settings_json_uses_camel_case() {
        let json = serde_json::to_string(&AppSettings::default()).unwrap();
        assert!(json.contains("\"sortOrder\":\"mostRecent\""));
        assert!(json.contains("\"hideCompletedMonths\":false"));
    }

    #[test]
    fn test_stats_missing_fields_default() {
        let stats: UserStats = serde_json::from_str(r#"{"totalPhotosReviewed":4}"#).unwrap();
        assert_eq!(stats.total_photos_reviewed, 4);
        assert_eq!(stats.sessions_completed, 0);
        assert!(stats.completed_months.is_empty());
    }
}
