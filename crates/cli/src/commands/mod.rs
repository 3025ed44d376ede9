pub mod bookmarks;
pub mod months;
pub mod review;
pub mod settings;
pub mod stats;
pub mod storage;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use swipeaway_core::catalog::RefreshProgress;
use swipeaway_core::source::AssetSource;
use swipeaway_core::store::KeyValueStore;
use swipeaway_core::Swipeaway;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.green} {prefix:.dim} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Load the library into the catalog behind a spinner.
pub(crate) fn load_library<S: AssetSource, K: KeyValueStore>(
    app: &mut Swipeaway<S, K>,
) -> Result<usize> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_prefix("Loading");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = app.refresh_library(Some(&mut |progress| match progress {
        RefreshProgress::PageLoaded { fetched } => {
            pb.set_message(format!("{fetched} photos"));
        }
        RefreshProgress::Complete { photos, months } => {
            pb.set_message(format!("{photos} photos in {months} months"));
        }
    }));
    pb.finish_and_clear();

    let count = result?;
    if app.catalog().is_truncated() {
        println!("{}", truncation_notice(app.config().max_assets));
    }
    Ok(count)
}

/// The cap applies in the source's listing order, which is not always
/// capture order.
pub(crate) fn truncation_notice(max_assets: usize) -> String {
    format!("  Loaded the first {max_assets} photos the library listed; the rest are not shown.")
}

pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1_048_576), "3.0 MB");
        assert_eq!(format_size(2_500_000_000), "2.3 GB");
    }

    #[test]
    fn test_truncation_notice_names_the_cap_not_an_order() {
        let notice = truncation_notice(2000);
        assert!(notice.contains("2000"));
        assert!(!notice.contains("newest"));
    }
}
