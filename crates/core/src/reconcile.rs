//! Turning a closed session's pending deletions into real deletions.

use std::collections::HashSet;

use crate::catalog::PhotoCatalog;
use crate::domain::{AssetId, PermissionLevel};
use crate::source::AssetSource;

/// Result of one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending.
    Nothing,
    /// The source confirmed the batch.
    Deleted(usize),
    /// The source rejected the batch or errored.
    Failed(usize),
    /// Access below full; the physical call was never made.
    PermissionDenied(PermissionLevel, usize),
}

impl FlushOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FlushOutcome::Nothing | FlushOutcome::Deleted(_))
    }
}

/// Issue one batch delete for `pending`, then drop those ids from `catalog`.
///
/// The catalog is pruned whatever the outcome: a photo the user chose to
/// delete never comes back into view this run, even if the platform kept it.
/// A later refresh shows the library's real contents again.
pub fn flush<S: AssetSource + ?Sized>(
    source: &mut S,
    catalog: &mut PhotoCatalog,
    pending: &[AssetId],
) -> FlushOutcome {
    if pending.is_empty() {
        return FlushOutcome::Nothing;
    }

    let mut seen = HashSet::with_capacity(pending.len());
    let batch: Vec<AssetId> = pending
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();
    let count = batch.len();

    let level = source.permission_level();
    let outcome = if level != PermissionLevel::Full {
        tracing::warn!(%level, count, "skipping delete, photo access is not full");
        FlushOutcome::PermissionDenied(level, count)
    } else {
        match source.delete_batch(&batch) {
            Ok(true) => {
                tracing::info!(count, "deleted photos");
                FlushOutcome::Deleted(count)
            }
            Ok(false) => {
                tracing::warn!(count, "platform rejected batch delete");
                FlushOutcome::Failed(count)
            }
            Err(e) => {
                tracing::error!(count, "batch delete failed: {e}");
                FlushOutcome::Failed(count)
            }
        }
    };

    let ids: HashSet<AssetId> = batch.into_iter().collect();
    let removed = catalog.remove_assets(&ids);
    tracing::debug!(removed, "pruned catalog");

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::test_asset;
    use crate::source::{DeleteBehavior, MemoryAssetSource};
    use chrono::FixedOffset;

    fn setup(source: &mut MemoryAssetSource) -> PhotoCatalog {
        let mut catalog = PhotoCatalog::new(FixedOffset::east_opt(0).unwrap());
        catalog.refresh(source, &EngineConfig::default(), None).unwrap();
        catalog
    }

    fn source() -> MemoryAssetSource {
        MemoryAssetSource::new(vec![
            test_asset("p1", 3000, Some(10)),
            test_asset("p2", 2000, Some(20)),
            test_asset("p3", 1000, Some(30)),
        ])
    }

    fn ids(raw: &[&str]) -> Vec<AssetId> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_pending_makes_no_call() {
        let mut source = source();
        let mut catalog = setup(&mut source);
        assert_eq!(flush(&mut source, &mut catalog, &[]), FlushOutcome::Nothing);
        assert!(source.delete_calls().is_empty());
        assert_eq!(catalog.total_photo_count(), 3);
    }

    #[test]
    fn test_successful_flush() {
        let mut source = source();
        let mut catalog = setup(&mut source);

        let outcome = flush(&mut source, &mut catalog, &ids(&["p1", "p3"]));
        assert_eq!(outcome, FlushOutcome::Deleted(2));
        assert!(outcome.is_success());
        assert_eq!(source.delete_calls().len(), 1);
        assert_eq!(source.delete_calls()[0], ids(&["p1", "p3"]));
        assert_eq!(source.assets().len(), 1);
        assert!(!catalog.contains("p1"));
        assert!(catalog.contains("p2"));
        assert!(!catalog.contains("p3"));
    }

    #[test]
    fn test_failed_flush_still_prunes_catalog() {
        let mut source = source().with_delete_behavior(DeleteBehavior::Fail);
        let mut catalog = setup(&mut source);

        let outcome = flush(&mut source, &mut catalog, &ids(&["p2"]));
        assert_eq!(outcome, FlushOutcome::Failed(1));
        assert!(!outcome.is_success());
        assert_eq!(source.assets().len(), 3);
        assert!(!catalog.contains("p2"));
    }

    #[test]
    fn test_source_error_counts_as_failure() {
        let mut source = source().with_delete_behavior(DeleteBehavior::Error);
        let mut catalog = setup(&mut source);

        let outcome = flush(&mut source, &mut catalog, &ids(&["p1"]));
        assert_eq!(outcome, FlushOutcome::Failed(1));
        assert!(!catalog.contains("p1"));
    }

    #[test]
    fn test_limited_permission_skips_physical_delete() {
        let mut source = source().with_permission(PermissionLevel::Limited);
        let mut catalog = setup(&mut source);

        let outcome = flush(&mut source, &mut catalog, &ids(&["p1", "p2"]));
        assert_eq!(outcome, FlushOutcome::PermissionDenied(PermissionLevel::Limited, 2));
        assert!(source.delete_calls().is_empty());
        assert_eq!(catalog.total_photo_count(), 1);
    }

    #[test]
    fn test_duplicates_are_sent_once() {
        let mut source = source();
        let mut catalog = setup(&mut source);

        let outcome = flush(&mut source, &mut catalog, &ids(&["p1", "p1", "p2"]));
        assert_eq!(outcome, FlushOutcome::Deleted(2));
        assert_eq!(source.delete_calls()[0], ids(&["p1", "p2"]));
    }

    #[test]
    fn test_ids_already_gone_are_harmless() {
        let mut source = source();
        let mut catalog = setup(&mut source);

        flush(&mut source, &mut catalog, &ids(&["p1"]));
        let outcome = flush(&mut source, &mut catalog, &ids(&["p1", "ghost"]));
        assert_eq!(outcome, FlushOutcome::Deleted(2));
        assert_eq!(catalog.total_photo_count(), 2);
    }
}
