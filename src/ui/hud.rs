use std::cell::RefCell;
use std::rc::Rc;

use gtk4::glib;
use gtk4::prelude::*;

use super::routes::Route;
use super::state::AppState;

fn subtitle_text(st: &AppState) -> String {
    if st.active_route == Route::Play {
        let mins = st.seconds_elapsed / 60;
        let secs = st.seconds_elapsed % 60;
        let theme = if st.round_theme.is_empty() {
            "Play"
        } else {
            st.round_theme.as_str()
        };
        format!("{theme} | {mins:02}:{secs:02}")
    } else {
        st.active_route.title().to_string()
    }
}

pub(super) fn update_subtitle(st: &AppState) {
    if let Some(subtitle) = &st.title_subtitle {
        subtitle.set_text(&subtitle_text(st));
    }
}

pub(super) fn stop_timer(st: &mut AppState) {
    if let Some(handle) = st.timer_handle.take() {
        handle.remove();
    }
}

pub(super) fn start_timer(state: &Rc<RefCell<AppState>>, reset_elapsed: bool) {
    let mut st = state.borrow_mut();
    stop_timer(&mut st);
    if reset_elapsed {
        st.seconds_elapsed = 0;
    }
    update_subtitle(&st);

    let state_clone = state.clone();
    let handle = glib::timeout_add_local(std::time::Duration::from_secs(1), move || {
        let mut st = state_clone.borrow_mut();
        st.seconds_elapsed += 1;
        update_subtitle(&st);
        glib::ControlFlow::Continue
    });
    st.timer_handle = Some(handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_subtitle_shows_the_theme_and_elapsed_time() {
        let mut st = AppState::new();
        st.active_route = Route::Play;
        st.round_theme = "Animals".to_string();
        st.seconds_elapsed = 75;
        assert_eq!(subtitle_text(&st), "Animals | 01:15");
    }

    #[test]
    fn play_subtitle_falls_back_before_the_deck_arrives() {
        let mut st = AppState::new();
        st.active_route = Route::Play;
        assert_eq!(subtitle_text(&st), "Play | 00:00");
    }

    #[test]
    fn other_pages_show_their_title() {
        let mut st = AppState::new();
        st.active_route = Route::Score;
        assert_eq!(subtitle_text(&st), "Best score");
        st.active_route = Route::About;
        assert_eq!(subtitle_text(&st), "About us");
    }
}
