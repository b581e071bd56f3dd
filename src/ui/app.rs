use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use gio::SimpleAction;

use super::board::MATCHED_MARK;
use super::dialogs::show_about_dialog;
use super::hud::{moves_text, record_text};
use super::records::show_history_dialog;
use super::scene::apply_commands;
use super::state::AppState;
use crate::LOG_DOMAIN;
use crate::config::{APP_ID, APP_NAME, Settings};
use crate::game::{GridSize, Phase, RenderCommand, ResolveTicket, board::MIN_SIZE};

const STYLE_CSS: &str = include_str!("../../data/style.css");

pub fn run() -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        load_css();

        let settings = Settings::from_env();
        glib::g_info!(
            LOG_DOMAIN,
            "Game history lives in {}",
            settings.data_dir.display()
        );
        let state = Rc::new(RefCell::new(AppState::new(settings)));

        let new_game_action = SimpleAction::new("new-game", None);
        new_game_action.connect_activate({
            let state = state.clone();
            move |_, _| start_game(&state)
        });
        app.add_action(&new_game_action);
        app.set_accels_for_action("app.new-game", &["<Control>n"]);

        let history_action = SimpleAction::new("history", None);
        history_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| {
                show_history_dialog(&state, &app);
            }
        });
        app.add_action(&history_action);

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);
        app.set_accels_for_action("app.quit", &["<Control>q"]);

        let title = gtk::Label::new(None);
        title.set_markup(&format!("<b>{}</b>", APP_NAME));
        let header = adw::HeaderBar::builder().title_widget(&title).build();
        header.add_css_class("flat");

        let menu_model = gio::Menu::new();
        menu_model.append(Some("New Game"), Some("app.new-game"));
        menu_model.append(Some("History"), Some("app.history"));
        let about_label = format!("About {}", APP_NAME);
        menu_model.append(Some(about_label.as_str()), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();
        header.pack_end(&menu_button);

        let game_view = build_game_view(&state);

        let toolbar = adw::ToolbarView::new();
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&game_view));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title(APP_NAME)
            .default_width(720)
            .default_height(860)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 480);

        win.connect_close_request({
            let state = state.clone();
            move |_| {
                let st = state.borrow();
                if !matches!(st.session.phase(), Phase::Idle | Phase::Won) {
                    glib::g_info!(
                        LOG_DOMAIN,
                        "Abandoning unfinished game after {} moves",
                        st.session.moves()
                    );
                }
                glib::Propagation::Proceed
            }
        });

        let best = state.borrow().session.best_record();
        apply_commands(&state, &[RenderCommand::SetBest(best)]);
        win.present();
    });

    app.run()
}

fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(STYLE_CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

fn build_controls(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let controls = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    controls.set_halign(gtk::Align::Center);
    controls.add_css_class("controls");

    let size_label = gtk::Label::new(Some("Grid size"));
    let default_size = state.borrow().settings.default_size;
    let size_selector = gtk::SpinButton::with_range(
        MIN_SIZE as f64,
        GridSize::max().get() as f64,
        2.0,
    );
    size_selector.set_value(default_size.get() as f64);
    size_selector.set_numeric(true);
    // Only even sides can be paired.
    size_selector.set_snap_to_ticks(true);

    let start_button = gtk::Button::with_label("Start");
    start_button.add_css_class("suggested-action");
    start_button.connect_clicked({
        let state = state.clone();
        move |_| start_game(&state)
    });

    controls.append(&size_label);
    controls.append(&size_selector);
    controls.append(&start_button);

    state.borrow_mut().size_selector = Some(size_selector);
    controls
}

fn build_game_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.set_margin_top(12);
    root.set_margin_bottom(12);
    root.set_margin_start(12);
    root.set_margin_end(12);
    root.add_css_class("game-root");

    root.append(&build_controls(state));

    let info_row = gtk::Box::new(gtk::Orientation::Horizontal, 24);
    info_row.set_halign(gtk::Align::Center);
    let record_label = gtk::Label::new(Some(&record_text(None)));
    record_label.add_css_class("record-label");
    let moves_label = gtk::Label::new(Some(&moves_text(0)));
    moves_label.add_css_class("moves-label");
    info_row.append(&record_label);
    info_row.append(&moves_label);
    root.append(&info_row);

    let status_label = gtk::Label::new(None);
    status_label.add_css_class("status-label");
    status_label.add_css_class("title-2");
    root.append(&status_label);

    let board_container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    board_container.set_halign(gtk::Align::Center);
    board_container.set_valign(gtk::Align::Center);
    board_container.set_hexpand(true);
    board_container.set_vexpand(true);

    let placeholder = gtk::Label::new(Some(&format!(
        "Pick a grid size and press Start. Pairs turn into {} once found.",
        MATCHED_MARK
    )));
    placeholder.add_css_class("dim-label");
    board_container.append(&placeholder);
    root.append(&board_container);

    {
        let mut st = state.borrow_mut();
        st.board_container = Some(board_container);
        st.record_label = Some(record_label);
        st.moves_label = Some(moves_label);
        st.status_label = Some(status_label);
    }

    root
}

fn selected_size(state: &Rc<RefCell<AppState>>) -> Option<GridSize> {
    let st = state.borrow();
    let Some(selector) = &st.size_selector else {
        return Some(st.settings.default_size);
    };
    let raw = selector.value_as_int().max(0) as u32;
    match GridSize::new(raw) {
        Ok(size) => Some(size),
        Err(err) => {
            glib::g_warning!(LOG_DOMAIN, "Refusing to start: {}", err);
            None
        }
    }
}

pub(super) fn start_game(state: &Rc<RefCell<AppState>>) {
    let Some(size) = selected_size(state) else {
        return;
    };
    let commands = state.borrow_mut().session.start(size);
    apply_commands(state, &commands);
}

pub(super) fn handle_cell_click(state: &Rc<RefCell<AppState>>, position: usize) {
    let step = state.borrow_mut().session.reveal(position);
    apply_commands(state, &step.commands);
    if let Some(ticket) = step.resolve {
        schedule_resolve(state, ticket);
    }
}

fn schedule_resolve(state: &Rc<RefCell<AppState>>, ticket: ResolveTicket) {
    let delay = state.borrow().settings.reveal_delay;
    let state_resolve = state.clone();
    glib::timeout_add_local(delay, move || {
        if ticket.is_cancelled() {
            return glib::ControlFlow::Break;
        }
        let commands = state_resolve.borrow_mut().session.resolve(&ticket);
        apply_commands(&state_resolve, &commands);
        glib::ControlFlow::Break
    });
}
