use gtk4 as gtk;

use super::board::BoardView;
use crate::config::Settings;
use crate::game::{GameSession, JsonFileStore, ScoreStore};

pub struct AppState {
    pub settings: Settings,
    pub session: GameSession<JsonFileStore>,

    // Widgets, filled in once the window is built
    pub board: Option<BoardView>,
    pub board_container: Option<gtk::Box>,
    pub size_selector: Option<gtk::SpinButton>,
    pub status_label: Option<gtk::Label>,
    pub record_label: Option<gtk::Label>,
    pub moves_label: Option<gtk::Label>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let store = JsonFileStore::new(&settings.data_dir);
        Self {
            settings,
            session: GameSession::new(ScoreStore::new(store)),
            board: None,
            board_container: None,
            size_selector: None,
            status_label: None,
            record_label: None,
            moves_label: None,
        }
    }
}
