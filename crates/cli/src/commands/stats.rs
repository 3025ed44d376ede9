use anyhow::Result;
use swipeaway_core::domain::UserStats;
use swipeaway_core::source::AssetSource;
use swipeaway_core::store::KeyValueStore;
use swipeaway_core::Swipeaway;

use super::format_size;

/// Share of reviewed photos that were deleted, as a whole percentage.
pub(crate) fn delete_rate(stats: &UserStats) -> u64 {
    if stats.total_photos_reviewed == 0 {
        return 0;
    }
    stats.total_photos_deleted * 100 / stats.total_photos_reviewed
}

pub fn run<S: AssetSource, K: KeyValueStore>(app: &Swipeaway<S, K>) -> Result<()> {
    let stats = app.stats();

    println!();
    println!("  Swipeaway Stats");
    println!("  ===============");
    println!();
    println!("   Reviewed:   {:>8}", stats.total_photos_reviewed);
    println!(
        "   Deleted:    {:>8}        ({}% of reviewed)",
        stats.total_photos_deleted,
        delete_rate(stats)
    );
    println!("   Space:      {:>8}", format_size(stats.total_space_saved));
    println!("   Sessions:   {:>8}", stats.sessions_completed);
    println!("   Months:     {:>8}        fully reviewed", stats.completed_months.len());
    println!();
    Ok(())
}
