use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some("Instructions"),
        Some(
            "Flip two cards per turn and find the matching pairs.\n\
A pair stays open; a mismatch turns back after a moment.\n\
Clear the whole field as fast and with as few misses as you can.",
        ),
    );
    dialog.add_response("ok", "Got it");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Matchup")
        .application_icon("io.basshift.matchup")
        .developer_name("Sebastian Dávila (Basshift)")
        .developers(vec!["Sebastian Dávila (Basshift)"])
        .version("1.0.0")
        .comments("A card matching game with themed decks.")
        .issue_url("https://github.com/basshift/Matchup/issues")
        .support_url("https://github.com/basshift/Matchup")
        .website("https://github.com/basshift/Matchup")
        .build();
    dialog.add_legal_section(
        "Matchup",
        Some("© 2026 Sebastian Dávila (Basshift)"),
        gtk::License::MitX11,
        None,
    );
    dialog.present(app.active_window().as_ref());
    dialog
}
