use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;

use super::state::AppState;
use crate::game::GameRecord;

const TOP_LIMIT: usize = 3;
const RECENT_LIMIT: usize = 10;

fn date_label(timestamp_ms: i64) -> String {
    if let Ok(dt) = glib::DateTime::from_unix_local(timestamp_ms / 1000)
        && let Ok(text) = dt.format("%Y-%m-%d %H:%M")
    {
        return text.to_string();
    }
    "Unknown date".to_string()
}

fn table_cell(text: &str, class_name: &str, width_chars: i32) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class(class_name);
    label.set_halign(gtk::Align::Fill);
    label.set_hexpand(true);
    label.set_xalign(0.5);
    label.set_width_chars(width_chars);
    label
}

fn section_title(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("heading");
    label.set_halign(gtk::Align::Center);
    label
}

fn build_history_grid(entries: &[GameRecord], target_rows: usize) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.set_hexpand(true);
    grid.set_column_homogeneous(true);
    grid.set_column_spacing(10);
    grid.set_row_spacing(5);
    grid.attach(&table_cell("Moves", "history-head", 6), 0, 0, 1, 1);
    grid.attach(&table_cell("Finished", "history-head", 16), 1, 0, 1, 1);

    for idx in 0..target_rows {
        let row = (idx + 1) as i32;
        let (moves_text, date_text) = match entries.get(idx) {
            Some(entry) => (entry.moves.to_string(), date_label(entry.timestamp)),
            None => ("---".to_string(), "---".to_string()),
        };
        grid.attach(&table_cell(&moves_text, "history-row", 6), 0, row, 1, 1);
        grid.attach(&table_cell(&date_text, "history-row", 16), 1, row, 1, 1);
    }

    grid
}

pub fn show_history_dialog(state: &Rc<RefCell<AppState>>, app: &adw::Application) -> adw::Dialog {
    let parent_window = app.active_window();
    let dialog = adw::Dialog::new();
    dialog.set_can_close(true);

    let title = gtk::Label::new(Some("HISTORY"));
    title.add_css_class("heading");
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&title));
    header.set_show_end_title_buttons(true);

    let (top_entries, recent_entries) = {
        let st = state.borrow();
        let scores = st.session.scores();
        (scores.top(TOP_LIMIT), scores.recent(RECENT_LIMIT))
    };

    let content = gtk::Box::new(gtk::Orientation::Vertical, 8);
    content.set_margin_top(10);
    content.set_margin_bottom(10);
    content.set_margin_start(10);
    content.set_margin_end(10);
    content.append(&section_title("BEST 3"));
    content.append(&build_history_grid(&top_entries, TOP_LIMIT));
    content.append(&section_title("LATEST 10"));
    content.append(&build_history_grid(&recent_entries, RECENT_LIMIT));

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&content));

    dialog.set_child(Some(&toolbar));
    dialog.present(parent_window.as_ref());
    dialog
}
