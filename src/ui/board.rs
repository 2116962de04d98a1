use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::pango;
use gtk4::prelude::*;

use super::app::handle_tile_click;
use super::state::{AppState, TileStatus};

pub const TILE_GAP: i32 = 8;

// Also refreshes the button handles the click path indexes into.
pub fn rebuild_board(state: &Rc<RefCell<AppState>>) {
    let Some(container) = state.borrow().board_container.clone() else {
        return;
    };
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }

    if state.borrow().card_span == "13%" {
        container.add_css_class("compact");
    } else {
        container.remove_css_class("compact");
    }

    let grid = build_board_grid(state);
    container.append(&grid);
}

pub fn build_board_grid(state: &Rc<RefCell<AppState>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.add_css_class("match-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Fill);
    grid.set_valign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_vexpand(true);

    let (grid_cols, grid_rows) = {
        let st = state.borrow();
        (st.grid_cols, st.grid_rows)
    };

    let mut buttons = Vec::new();

    for i in 0..(grid_rows * grid_cols) {
        let index = i as usize;
        let aspect_frame = gtk::AspectFrame::builder()
            .ratio(1.0)
            .obey_child(false)
            .halign(gtk::Align::Fill)
            .valign(gtk::Align::Fill)
            .hexpand(true)
            .vexpand(true)
            .build();

        let button = gtk::Button::builder()
            .css_classes(vec!["match-card"])
            .build();
        button.set_hexpand(true);
        button.set_vexpand(true);

        let drawing_area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();
        drawing_area.add_css_class("match-card-face");

        let state_draw = state.clone();
        drawing_area.set_draw_func(move |area, cr, width, height| {
            let st = state_draw.borrow();
            if index >= st.tiles.len() {
                return;
            }
            let tile = &st.tiles[index];
            let is_hidden = tile.status == TileStatus::Hidden;
            let text = if is_hidden { "?" } else { face_text(&tile.value) };
            if text.is_empty() {
                return;
            }

            let min_dim = width.min(height) as f64;
            let font_size = if is_hidden {
                min_dim * 0.34
            } else {
                min_dim * 0.40
            };

            cr.set_antialias(gtk::cairo::Antialias::Best);

            let layout = pangocairo::functions::create_layout(cr);
            let mut font_desc = pango::FontDescription::new();
            if is_hidden {
                font_desc.set_family("Cantarell, Noto Sans, sans");
                font_desc.set_weight(pango::Weight::Bold);
            } else {
                font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
            }
            font_desc.set_size((font_size * pango::SCALE as f64) as i32);
            layout.set_font_description(Some(&font_desc));
            layout.set_text(text);

            let fg = area.style_context().color();
            cr.set_source_rgba(
                fg.red() as f64,
                fg.green() as f64,
                fg.blue() as f64,
                fg.alpha() as f64,
            );

            let (text_width, text_height) = layout.pixel_size();
            cr.move_to(
                (width as f64 - text_width as f64) / 2.0,
                (height as f64 - text_height as f64) / 2.0,
            );

            pangocairo::functions::show_layout(cr, &layout);
        });

        button.set_child(Some(&drawing_area));

        if let Some(tile) = state.borrow().tiles.get(index) {
            match tile.status {
                TileStatus::Matched => button.add_css_class("matched"),
                TileStatus::Flipped => button.add_css_class("active"),
                TileStatus::Hidden => (),
            }
        }

        let state_clone = state.clone();
        button.connect_clicked(move |_| {
            handle_tile_click(&state_clone, index);
        });

        aspect_frame.set_child(Some(&button));
        grid.attach(&aspect_frame, i % grid_cols, i / grid_cols, 1, 1);
        buttons.push(button);
    }

    state.borrow_mut().grid_buttons = buttons;

    grid
}

fn face_text(value: &str) -> &str {
    value.rsplit('/').next().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_text_drops_the_category_prefix() {
        assert_eq!(face_text("Animals/🐶"), "🐶");
        assert_eq!(face_text("a/b/c"), "c");
    }

    #[test]
    fn face_text_passes_bare_values_through() {
        assert_eq!(face_text("🐶"), "🐶");
        assert_eq!(face_text(""), "");
    }
}
