use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

use crate::config::{APP_ID, APP_NAME};

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name(APP_NAME)
        .application_icon(APP_ID)
        .version(env!("CARGO_PKG_VERSION"))
        .comments(
            "Reveal two tiles per turn and find every pair.\n\
Fewer moves make a better record.",
        )
        .build();
    dialog.add_legal_section(APP_NAME, None, gtk::License::MitX11, None);
    dialog.present(app.active_window().as_ref());
    dialog
}
