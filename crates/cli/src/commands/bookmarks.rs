use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use swipeaway_core::source::AssetSource;
use swipeaway_core::store::KeyValueStore;
use swipeaway_core::Swipeaway;

use super::{format_size, load_library};

pub fn run<S: AssetSource, K: KeyValueStore>(app: &mut Swipeaway<S, K>) -> Result<()> {
    load_library(app)?;

    let photos = app.bookmarked_photos();
    let missing = app.bookmarks().len() - photos.len();
    if photos.is_empty() {
        println!("  No bookmarked photos. Press 'b' while reviewing to bookmark one.");
        return Ok(());
    }

    let offset = app.catalog().offset();
    let estimate = &app.config().size_estimate;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("File"),
        Cell::new("Taken"),
        Cell::new("Size"),
        Cell::new("Location"),
    ]);
    for photo in &photos {
        table.add_row(vec![
            Cell::new(&photo.filename),
            Cell::new(photo.created_at(offset).format("%Y-%m-%d").to_string()),
            Cell::new(format_size(photo.effective_size(estimate))),
            Cell::new(&photo.uri),
        ]);
    }

    println!();
    println!("  {} bookmarked photo(s)", photos.len());
    println!("{table}");
    if missing > 0 {
        println!("  {missing} bookmarked photo(s) are no longer in the library.");
    }
    println!();
    Ok(())
}
