use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use swipeaway_core::source::AssetSource;
use swipeaway_core::store::KeyValueStore;
use swipeaway_core::Swipeaway;

use super::{format_size, load_library};

pub fn run<S: AssetSource, K: KeyValueStore>(app: &mut Swipeaway<S, K>) -> Result<()> {
    let total = load_library(app)?;
    let estimate = &app.config().size_estimate;
    let months = app.visible_months();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("Month"),
        Cell::new("Photos"),
        Cell::new("Size"),
        Cell::new("Reviewed"),
    ]);

    for group in &months {
        let reviewed = if app.is_month_completed(&group.id) {
            Cell::new("\u{2714}").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(&group.id).fg(Color::Cyan),
            Cell::new(&group.label),
            Cell::new(group.photo_count),
            Cell::new(format_size(group.total_size(estimate))),
            reviewed,
        ]);
    }

    let settings = app.settings();
    println!();
    println!(
        "  {} photos in {} months (sorted by {}{})",
        total,
        app.catalog().groups().len(),
        settings.sort_order.as_str(),
        if settings.hide_completed_months {
            ", reviewed months hidden"
        } else {
            ""
        }
    );
    println!("{table}");
    println!();
    println!("  Run 'swipeaway review month <ID>' to start swiping.");
    println!();
    Ok(())
}
