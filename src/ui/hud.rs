use gtk4 as gtk;

use crate::game::{GameRecord, Status};

pub fn status_text(status: Status) -> &'static str {
    match status {
        Status::Playing => "",
        Status::Won => "🎉 You Win!",
    }
}

pub fn record_text(best: Option<GameRecord>) -> String {
    match best {
        Some(record) => format!("🏆 Record: {} moves", record.moves),
        None => "🏆 Record: N/A".to_string(),
    }
}

pub fn moves_text(moves: u32) -> String {
    format!("Moves: {}", moves)
}

pub(super) fn set_label(label: Option<&gtk::Label>, text: &str) {
    if let Some(label) = label {
        label.set_text(text);
    }
}
