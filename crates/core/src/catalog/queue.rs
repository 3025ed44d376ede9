use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;

use crate::domain::{PhotoAsset, ReviewMode};

use super::PhotoCatalog;

/// Build the ordered review queue for `mode`.
///
/// Never fails: an unknown month or a day with no matches yields an empty
/// queue, which the session engine treats as immediately exhausted.
pub fn build_queue(catalog: &PhotoCatalog, mode: &ReviewMode) -> Vec<PhotoAsset> {
    match mode {
        ReviewMode::Recents => catalog
            .groups()
            .first()
            .map(|g| g.photos.clone())
            .unwrap_or_default(),
        ReviewMode::Month(id) => match catalog.find(id) {
            Some(group) => group.photos.clone(),
            None => {
                tracing::warn!(month = %id, "month not in catalog, queue is empty");
                Vec::new()
            }
        },
        ReviewMode::Random => shuffled(catalog),
        ReviewMode::OnThisDay(today) => on_this_day(catalog, *today),
        ReviewMode::All => catalog.all_photos().cloned().collect(),
    }
}

/// Every photo in a fresh uniform random order.
fn shuffled(catalog: &PhotoCatalog) -> Vec<PhotoAsset> {
    let mut photos: Vec<PhotoAsset> = catalog.all_photos().cloned().collect();
    photos.shuffle(&mut rand::rng());
    photos
}

/// Photos taken on the same month and day as `today`, in any year.
pub fn on_this_day(catalog: &PhotoCatalog, today: NaiveDate) -> Vec<PhotoAsset> {
    let offset = catalog.offset();
    let photos: Vec<PhotoAsset> = catalog
        .all_photos()
        .filter(|p| {
            let date = p.created_on(offset);
            date.month() == today.month() && date.day() == today.day()
        })
        .cloned()
        .collect();
    tracing::debug!(%today, found = photos.len(), "on this day");
    photos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::test_asset;
    use crate::source::MemoryAssetSource;
    use chrono::{FixedOffset, TimeZone, Utc};
    use std::collections::HashSet;

    fn millis(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap().timestamp_millis()
    }

    fn catalog() -> PhotoCatalog {
        let mut source = MemoryAssetSource::new(vec![
            test_asset("a", millis(2024, 6, 15), None),
            test_asset("b", millis(2024, 6, 2), None),
            test_asset("c", millis(2022, 6, 15), None),
            test_asset("d", millis(2021, 3, 1), None),
            test_asset("e", millis(2019, 6, 15), None),
        ]);
        let mut catalog = PhotoCatalog::new(FixedOffset::east_opt(0).unwrap());
        catalog.refresh(&mut source, &EngineConfig::default(), None).unwrap();
        catalog
    }

    fn ids(queue: &[PhotoAsset]) -> Vec<&str> {
        queue.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_recents_is_newest_month() {
        let catalog = catalog();
        assert_eq!(ids(&build_queue(&catalog, &ReviewMode::Recents)), vec!["a", "b"]);
    }

    #[test]
    fn test_recents_on_empty_catalog() {
        let catalog = PhotoCatalog::new(FixedOffset::east_opt(0).unwrap());
        assert!(build_queue(&catalog, &ReviewMode::Recents).is_empty());
    }

    #[test]
    fn test_month_queue() {
        let catalog = catalog();
        let queue = build_queue(&catalog, &ReviewMode::Month("2021-03".to_string()));
        assert_eq!(ids(&queue), vec!["d"]);
    }

    #[test]
    fn test_unknown_month_is_empty() {
        let catalog = catalog();
        assert!(build_queue(&catalog, &ReviewMode::Month("1999-01".to_string())).is_empty());
    }

    #[test]
    fn test_random_is_a_permutation() {
        let catalog = catalog();
        let queue = build_queue(&catalog, &ReviewMode::Random);
        assert_eq!(queue.len(), 5);
        let unique: HashSet<&str> = queue.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_on_this_day_spans_years() {
        let catalog = catalog();
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let queue = build_queue(&catalog, &ReviewMode::OnThisDay(today));
        assert_eq!(ids(&queue), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_on_this_day_no_matches() {
        let catalog = catalog();
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(build_queue(&catalog, &ReviewMode::OnThisDay(today)).is_empty());
    }

    #[test]
    fn test_all_is_canonical_order() {
        let catalog = catalog();
        assert_eq!(ids(&build_queue(&catalog, &ReviewMode::All)), vec!["a", "b", "c", "d", "e"]);
    }
}
