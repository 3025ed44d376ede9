use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use swipeaway_core::domain::{AppSettings, SortOrder};
use swipeaway_core::source::AssetSource;
use swipeaway_core::store::KeyValueStore;
use swipeaway_core::Swipeaway;

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn settings_table(settings: &AppSettings) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Setting"), Cell::new("Value")]);
    table.add_row(vec![Cell::new("Sort order"), Cell::new(settings.sort_order.as_str())]);
    table.add_row(vec![
        Cell::new("Hide reviewed months"),
        Cell::new(yes_no(settings.hide_completed_months)),
    ]);
    table.add_row(vec![
        Cell::new("Haptic feedback"),
        Cell::new(yes_no(settings.haptic_feedback)),
    ]);
    table
}

pub fn run<S: AssetSource, K: KeyValueStore>(
    app: &mut Swipeaway<S, K>,
    sort: Option<SortOrder>,
    hide_completed: Option<bool>,
    haptics: Option<bool>,
) -> Result<()> {
    if sort.is_some() || hide_completed.is_some() || haptics.is_some() {
        app.update_settings(|s| {
            if let Some(order) = sort {
                s.sort_order = order;
            }
            if let Some(hide) = hide_completed {
                s.hide_completed_months = hide;
            }
            if let Some(on) = haptics {
                s.haptic_feedback = on;
            }
        })?;
        println!("  Settings saved.");
    }

    println!("{}", settings_table(app.settings()));
    Ok(())
}
