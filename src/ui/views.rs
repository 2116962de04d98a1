use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use super::routes::{Piece, Route};
use super::state::{AppState, card_span, recompute_card_count};
use super::{app, catalog};

const BOARD_SIDES: [f64; 3] = [4.0, 5.0, 6.0];
const BOARD_SIDE_LABELS: [&str; 3] = ["4 × 4", "5 × 5", "6 × 6"];

pub(super) fn build_piece(state: &Rc<RefCell<AppState>>, piece: Piece) -> gtk::Widget {
    match piece {
        Piece::AboutPage => build_about_page().upcast(),
        Piece::SettingsPage => build_settings_page(state).upcast(),
        Piece::ScorePage => build_score_page(state).upcast(),
        Piece::Board => build_board_host(state).upcast(),
        Piece::WinBanner => build_win_banner(state).upcast(),
    }
}

fn page_shell(title: &str) -> gtk::Box {
    let page = gtk::Box::new(gtk::Orientation::Vertical, 14);
    page.add_css_class("page-root");
    page.set_hexpand(true);

    let heading = gtk::Label::new(Some(title));
    heading.add_css_class("page-title");
    heading.set_xalign(0.0);
    page.append(&heading);
    page
}

fn body_paragraph(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("page-body");
    label.set_xalign(0.0);
    label.set_wrap(true);
    label
}

fn build_about_page() -> gtk::Box {
    let page = page_shell("About us");
    page.append(&body_paragraph(
        "Matchup is a small memory game. Every round deals a shuffled field of \
         face-down cards where each picture appears exactly twice.",
    ));
    page.append(&body_paragraph(
        "Flip two cards per turn. A pair stays open, a mismatch turns back after \
         a short pause. Clear the whole field to finish the round; fewer misses \
         and a faster time mean a better score.",
    ));
    page.append(&body_paragraph(
        "Board size and card theme live on the settings page. Register a player \
         from the header, then press Play.",
    ));
    page
}

fn settings_row(label: &str, control: &impl IsA<gtk::Widget>) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    row.add_css_class("settings-row");

    let name = gtk::Label::new(Some(label));
    name.add_css_class("settings-row-label");
    name.set_xalign(0.0);
    name.set_hexpand(true);
    row.append(&name);
    row.append(control);
    row
}

fn size_selection_for(card_count: f64) -> u32 {
    BOARD_SIDES
        .iter()
        .position(|side| recompute_card_count(*side) == card_count)
        .unwrap_or(0) as u32
}

fn build_settings_page(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let page = page_shell("Settings");

    let (selected_size, selected_theme, theme_labels) = {
        let st = state.borrow();
        let labels: Vec<String> = if st.catalog.is_empty() {
            catalog::seed_catalog()
                .into_iter()
                .map(|entry| entry.category)
                .collect()
        } else {
            st.catalog.iter().map(|entry| entry.category.clone()).collect()
        };
        let theme = (st.settings.theme_index as u32).min(labels.len().saturating_sub(1) as u32);
        (size_selection_for(st.settings.card_count), theme, labels)
    };

    let size = gtk::DropDown::from_strings(&BOARD_SIDE_LABELS);
    size.set_selected(selected_size);
    page.append(&settings_row("Board size", &size));

    let label_refs: Vec<&str> = theme_labels.iter().map(String::as_str).collect();
    let theme = gtk::DropDown::from_strings(&label_refs);
    theme.set_selected(selected_theme);
    page.append(&settings_row("Card theme", &theme));

    page.append(&body_paragraph(
        "Changes apply to the next round you start.",
    ));

    wire_settings_inputs(state, &size, &theme);
    page
}

fn wire_settings_inputs(state: &Rc<RefCell<AppState>>, size: &gtk::DropDown, theme: &gtk::DropDown) {
    let state_for_size = state.clone();
    size.connect_selected_notify(move |dd| {
        let Some(side) = BOARD_SIDES.get(dd.selected() as usize) else {
            return;
        };
        {
            let mut st = state_for_size.borrow_mut();
            st.settings.card_count = recompute_card_count(*side);
            st.card_span = card_span(st.settings.card_count);
        }
        app::apply_card_size_to_layout(&state_for_size);
    });

    let state_for_theme = state.clone();
    theme.connect_selected_notify(move |dd| {
        let selected = dd.selected();
        if selected == gtk::INVALID_LIST_POSITION {
            return;
        }
        state_for_theme.borrow_mut().settings.theme_index = selected as usize;
    });
}

fn section_title(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("section-title");
    label.set_xalign(0.0);
    label
}

fn table_cell(text: &str, head: bool) -> gtk::Label {
    let cell = gtk::Label::new(Some(text));
    cell.add_css_class(if head { "score-table-head" } else { "score-table-row" });
    cell.set_xalign(0.0);
    cell
}

fn profile_cell(text: &str) -> gtk::Label {
    let text = if text.trim().is_empty() { "---" } else { text };
    table_cell(text, false)
}

fn build_score_page(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let page = page_shell("Best score");
    let st = state.borrow();

    if st.user_data.score > 0 {
        page.append(&section_title("Last round"));
        page.append(&body_paragraph(&format!(
            "{} points with the {} deck.",
            st.user_data.score, st.user_data.img
        )));
    }

    page.append(&section_title("Registered players"));
    if st.profile_store.profiles().is_empty() {
        let empty = body_paragraph("No players registered yet.");
        empty.add_css_class("dim-label");
        page.append(&empty);
    } else {
        let grid = gtk::Grid::new();
        grid.set_column_spacing(18);
        grid.set_row_spacing(6);
        let heads = ["#", "Name", "Surname", "Email", "Registered"];
        for (col, head) in heads.iter().enumerate() {
            grid.attach(&table_cell(head, true), col as i32, 0, 1, 1);
        }
        // Newest registration on top.
        for (row, entry) in st.profile_store.profiles().iter().rev().enumerate() {
            let row = row as i32 + 1;
            grid.attach(&table_cell(&entry.key.to_string(), false), 0, row, 1, 1);
            grid.attach(&profile_cell(&entry.profile.name), 1, row, 1, 1);
            grid.attach(&profile_cell(&entry.profile.surname), 2, row, 1, 1);
            grid.attach(&profile_cell(&entry.profile.email), 3, row, 1, 1);
            grid.attach(&profile_cell(&entry.profile.created), 4, row, 1, 1);
        }
        page.append(&grid);
    }
    page
}

fn build_board_host(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let container = gtk::Box::new(gtk::Orientation::Vertical, 10);
    container.add_css_class("board-card-container");
    container.set_hexpand(true);
    container.set_vexpand(true);
    container.set_valign(gtk::Align::Start);
    state.borrow_mut().board_container = Some(container.clone());
    container
}

fn build_win_banner(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let banner = gtk::Box::new(gtk::Orientation::Vertical, 6);
    banner.add_css_class("win-banner");
    banner.set_halign(gtk::Align::Center);
    banner.set_visible(false);

    let title = gtk::Label::new(Some("You win!"));
    title.add_css_class("win-banner-title");
    banner.append(&title);

    let detail = gtk::Label::new(None);
    banner.append(&detail);

    let replay = gtk::Button::with_label("Play again");
    replay.add_css_class("suggested-action");
    replay.set_halign(gtk::Align::Center);
    replay.connect_clicked(|button| {
        let _ = button.activate_action("app.navigate", Some(&Route::Play.name().to_variant()));
    });
    banner.append(&replay);

    let mut st = state.borrow_mut();
    st.win_banner = Some(banner.clone());
    st.win_banner_label = Some(detail);
    banner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_selector_reopens_on_the_stored_count() {
        assert_eq!(size_selection_for(8.0), 0);
        assert_eq!(size_selection_for(12.5), 1);
        assert_eq!(size_selection_for(18.0), 2);
    }

    #[test]
    fn unknown_counts_fall_back_to_the_first_size() {
        assert_eq!(size_selection_for(99.0), 0);
        assert_eq!(size_selection_for(0.0), 0);
    }
}
