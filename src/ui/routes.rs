use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use super::state::AppState;
use super::{app, hud, views};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    About,
    Settings,
    Score,
    Play,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Piece {
    AboutPage,
    SettingsPage,
    ScorePage,
    Board,
    WinBanner,
}

impl Route {
    pub fn from_name(name: &str) -> Option<Route> {
        match name {
            "about" => Some(Route::About),
            "settings" => Some(Route::Settings),
            "score" => Some(Route::Score),
            "play" => Some(Route::Play),
            _ => None,
        }
    }

    pub fn resolve(name: &str) -> Route {
        Route::from_name(name).unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::About => "about",
            Route::Settings => "settings",
            Route::Score => "score",
            Route::Play => "play",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::About => "About us",
            Route::Settings => "Settings",
            Route::Score => "Best score",
            Route::Play => "Play",
        }
    }

    pub fn pieces(self) -> &'static [Piece] {
        match self {
            Route::About => &[Piece::AboutPage],
            Route::Settings => &[Piece::SettingsPage],
            Route::Score => &[Piece::ScorePage],
            Route::Play => &[Piece::Board, Piece::WinBanner],
        }
    }
}

pub fn navigate_to(state: &Rc<RefCell<AppState>>, name: &str) {
    mount(state, Route::resolve(name));
}

// Bumping game_id retires every pending flip timeout and any round fetch
// still in flight from the previous page.
pub fn mount(state: &Rc<RefCell<AppState>>, route: Route) {
    {
        let mut st = state.borrow_mut();
        st.game_id = st.game_id.wrapping_add(1);
        st.active_route = route;
        hud::stop_timer(&mut st);
    }

    let Some(root) = state.borrow().content_root.clone() else {
        return;
    };
    while let Some(child) = root.first_child() {
        root.remove(&child);
    }
    for piece in route.pieces() {
        root.append(&views::build_piece(state, *piece));
    }

    refresh_nav_indicator(state);
    hud::update_subtitle(&state.borrow());

    if route == Route::Play {
        app::start_round(state);
    }
}

fn refresh_nav_indicator(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    for (route, button) in &st.nav_buttons {
        if *route == st.active_route {
            button.add_css_class("nav-active");
        } else {
            button.remove_css_class("nav-active");
        }
    }
}
