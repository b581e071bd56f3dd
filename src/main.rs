mod config;
mod game;
mod ui;

/// GLib log domain; `G_MESSAGES_DEBUG=memory-match` enables debug output.
pub const LOG_DOMAIN: &str = "memory-match";

fn main() -> glib::ExitCode {
    ui::app::run()
}
