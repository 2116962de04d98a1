use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use gtk4 as gtk;
use gtk4::gdk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use gio::SimpleAction;

use super::board;
use super::catalog;
use super::dialogs::{show_about_dialog, show_instructions_dialog};
use super::hud::{start_timer, stop_timer, update_subtitle};
use super::popup;
use super::profiles;
use super::routes::{self, Route};
use super::state::{AppState, TileStatus, round_score};

const PAIR_SIZE: usize = 2;
const FLIP_PHASE_MS: u64 = 260;
const MISMATCH_PAUSE_MS: u64 = 750;

pub(super) fn clear_flip_classes(button: &gtk::Button) {
    button.remove_css_class("flip-hide");
    button.remove_css_class("flip-show-a");
    button.remove_css_class("flip-show-b");
}

pub(super) fn redraw_button_child(button: &gtk::Button) {
    if let Some(child) = button.child() {
        child.queue_draw();
    }
}

pub(super) fn play_flip_show(st: &mut AppState, index: usize) {
    let button = st.grid_buttons[index].clone();
    clear_flip_classes(&button);
    st.flip_anim_phase = !st.flip_anim_phase;
    if st.flip_anim_phase {
        button.add_css_class("flip-show-a");
    } else {
        button.add_css_class("flip-show-b");
    }
    redraw_button_child(&button);
}

enum FlipOutcome {
    Continue,
    Mismatch,
    CompleteMatch,
}

fn evaluate_flip_outcome(st: &AppState, indices: &[usize], latest_index: usize) -> FlipOutcome {
    if indices.len() > 1 {
        let first_value = &st.tiles[indices[0]].value;
        let current_value = &st.tiles[latest_index].value;
        if current_value != first_value {
            return FlipOutcome::Mismatch;
        }
    }

    if indices.len() == PAIR_SIZE {
        FlipOutcome::CompleteMatch
    } else {
        FlipOutcome::Continue
    }
}

pub fn handle_tile_click(state: &Rc<RefCell<AppState>>, index: usize) {
    let mut st = state.borrow_mut();

    if index >= st.tiles.len() {
        return;
    }

    if st.lock_input || st.tiles[index].status != TileStatus::Hidden {
        return;
    }

    st.tiles[index].status = TileStatus::Flipped;
    play_flip_show(&mut st, index);
    st.grid_buttons[index].add_css_class("active");
    st.flipped_indices.push(index);

    let indices = st.flipped_indices.clone();
    let game_id = st.game_id;

    match evaluate_flip_outcome(&st, &indices, index) {
        FlipOutcome::Mismatch => {
            st.run_mismatches = st.run_mismatches.saturating_add(1);
            st.lock_input = true;
            let state_after_flip = state.clone();
            let indices_after_flip = indices;
            glib::timeout_add_local(std::time::Duration::from_millis(FLIP_PHASE_MS), move || {
                let st = state_after_flip.borrow();
                if st.game_id != game_id {
                    return glib::ControlFlow::Break;
                }
                for &idx in &indices_after_flip {
                    if let Some(button) = st.grid_buttons.get(idx) {
                        clear_flip_classes(button);
                        button.remove_css_class("mismatch-shake");
                        button.add_css_class("mismatch-shake");
                    }
                }
                drop(st);
                schedule_mismatch_reset(&state_after_flip, indices_after_flip.clone(), game_id);
                glib::ControlFlow::Break
            });
        }
        FlipOutcome::CompleteMatch => {
            st.run_matches = st.run_matches.saturating_add(1);
            st.lock_input = true;
            drop(st);
            let state_after_flip = state.clone();
            glib::timeout_add_local(std::time::Duration::from_millis(FLIP_PHASE_MS), move || {
                let st = state_after_flip.borrow();
                if st.game_id != game_id {
                    return glib::ControlFlow::Break;
                }
                drop(st);
                settle_completed_pair(&state_after_flip, indices.clone());
                glib::ControlFlow::Break
            });
        }
        FlipOutcome::Continue => {}
    }
}

fn settle_completed_pair(state: &Rc<RefCell<AppState>>, indices: Vec<usize>) {
    let mut st = state.borrow_mut();
    for &idx in &indices {
        st.tiles[idx].status = TileStatus::Matched;
        clear_flip_classes(&st.grid_buttons[idx]);
        st.grid_buttons[idx].remove_css_class("active");
        st.grid_buttons[idx].add_css_class("matched");
        redraw_button_child(&st.grid_buttons[idx]);
    }
    st.flipped_indices.clear();
    st.lock_input = false;

    if st.tiles.iter().all(|t| t.status == TileStatus::Matched) {
        stop_timer(&mut st);
        let pairs = st.tiles.iter().filter(|t| !t.value.is_empty()).count() / PAIR_SIZE;
        let score = round_score(pairs, st.seconds_elapsed, st.run_mismatches);
        st.user_data.score = score;
        st.user_data.img = st.round_theme.clone();
        show_win_banner(&st, score);
    }
}

fn show_win_banner(st: &AppState, score: u32) {
    if let Some(label) = &st.win_banner_label {
        let mins = st.seconds_elapsed / 60;
        let secs = st.seconds_elapsed % 60;
        label.set_text(&format!(
            "{score} points in {mins:02}:{secs:02} with {} misses",
            st.run_mismatches
        ));
    }
    if let Some(banner) = &st.win_banner {
        banner.set_visible(true);
    }
}

fn schedule_mismatch_reset(state: &Rc<RefCell<AppState>>, indices: Vec<usize>, game_id: u64) {
    let state_clone = state.clone();
    glib::timeout_add_local(
        std::time::Duration::from_millis(MISMATCH_PAUSE_MS),
        move || {
            let st = state_clone.borrow();
            if st.game_id != game_id {
                return glib::ControlFlow::Break;
            }
            for &idx in &indices {
                if let Some(button) = st.grid_buttons.get(idx) {
                    button.remove_css_class("mismatch-shake");
                    clear_flip_classes(button);
                    button.add_css_class("flip-hide");
                    redraw_button_child(button);
                }
            }
            drop(st);

            let state_swap = state_clone.clone();
            let indices_swap = indices.clone();
            glib::timeout_add_local(
                std::time::Duration::from_millis(FLIP_PHASE_MS),
                move || {
                    let mut st = state_swap.borrow_mut();
                    if st.game_id != game_id {
                        return glib::ControlFlow::Break;
                    }
                    for &idx in &indices_swap {
                        st.tiles[idx].status = TileStatus::Hidden;
                        st.grid_buttons[idx].remove_css_class("active");
                        play_flip_show(&mut st, idx);
                    }
                    glib::ControlFlow::Break
                },
            );

            let state_finish = state_clone.clone();
            let indices_finish = indices.clone();
            glib::timeout_add_local(
                std::time::Duration::from_millis(FLIP_PHASE_MS * 2),
                move || {
                    let mut st = state_finish.borrow_mut();
                    if st.game_id != game_id {
                        return glib::ControlFlow::Break;
                    }
                    for &idx in &indices_finish {
                        clear_flip_classes(&st.grid_buttons[idx]);
                        st.grid_buttons[idx].remove_css_class("active");
                        st.grid_buttons[idx].remove_css_class("mismatch-shake");
                        redraw_button_child(&st.grid_buttons[idx]);
                    }
                    st.flipped_indices.clear();
                    st.lock_input = false;
                    glib::ControlFlow::Break
                },
            );

            glib::ControlFlow::Break
        },
    );
}

// Input stays locked until the deck is on screen; a page change while the
// fetch is in flight retires it through game_id.
pub(super) fn start_round(state: &Rc<RefCell<AppState>>) {
    let game_id = {
        let mut st = state.borrow_mut();
        st.game_id = st.game_id.wrapping_add(1);
        st.lock_input = true;
        st.round_theme.clear();
        st.game_id
    };
    update_subtitle(&state.borrow());

    let state_fetch = state.clone();
    glib::spawn_future_local(async move {
        let loaded = catalog::load_catalog().await;

        let mut st = state_fetch.borrow_mut();
        if st.game_id != game_id {
            return;
        }

        // A broken catalog file leaves the board empty; the player can
        // still navigate away.
        st.catalog = match loaded {
            Ok(entries) => entries,
            Err(err) => {
                eprintln!("[Catalog] {err}");
                st.lock_input = false;
                return;
            }
        };

        let Some(plan) = catalog::plan_round(&st.catalog, &st.settings) else {
            st.lock_input = false;
            return;
        };
        st.round_theme = plan.theme.clone();
        st.reset_round(&plan.paths);
        st.lock_input = false;
        drop(st);

        board::rebuild_board(&state_fetch);
        start_timer(&state_fetch, true);
    });
}

pub(super) fn apply_card_size_to_layout(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    let Some(provider) = &st.dynamic_css_provider else {
        return;
    };
    let (min_size, radius) = match st.card_span {
        "18%" => (96, 14),
        "13%" => (72, 10),
        _ => (120, 18),
    };
    provider.load_from_data(&format!(
        ".match-card {{ min-width: {min_size}px; min-height: {min_size}px; border-radius: {radius}px; }}"
    ));
}

fn initialize(state: &Rc<RefCell<AppState>>) {
    {
        let mut st = state.borrow_mut();
        st.profile_store = profiles::ProfileStore::open(profiles::default_store_path());
    }
    apply_card_size_to_layout(state);
    popup::apply_popup_phase(&state.borrow());

    let root_is_empty = state
        .borrow()
        .content_root
        .as_ref()
        .is_some_and(|root| root.first_child().is_none());
    if root_is_empty {
        routes::mount(state, Route::About);
    }
}

pub fn run() {
    glib::set_prgname(Some("io.basshift.Matchup"));
    let app = adw::Application::builder()
        .application_id("io.basshift.Matchup")
        .build();

    app.connect_activate(move |app| {
        load_css();

        let state = Rc::new(RefCell::new(AppState::new()));

        let navigate_action = SimpleAction::new("navigate", Some(glib::VariantTy::STRING));
        navigate_action.connect_activate({
            let state = state.clone();
            move |_, param| {
                let name = param.and_then(|v| v.str()).unwrap_or_default();
                routes::navigate_to(&state, name);
            }
        });
        app.add_action(&navigate_action);

        let register_action = SimpleAction::new("register", None);
        register_action.connect_activate({
            let state = state.clone();
            move |_, _| popup::show_registration_popup(&state)
        });
        app.add_action(&register_action);

        let instructions_action = SimpleAction::new("instructions", None);
        instructions_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_instructions_dialog(&app);
            }
        });
        app.add_action(&instructions_action);

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

        let dynamic_css_provider = gtk::CssProvider::new();
        if let Some(display) = gdk::Display::default() {
            gtk::style_context_add_provider_for_display(
                &display,
                &dynamic_css_provider,
                gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }

        let title_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_box.set_valign(gtk::Align::Center);
        title_box.set_halign(gtk::Align::Center);

        let title_main = gtk::Label::builder()
            .label("Matchup")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-main"])
            .build();

        let title_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-subtitle", "caption"])
            .build();

        title_box.append(&title_main);
        title_box.append(&title_subtitle);

        let header = adw::HeaderBar::builder().title_widget(&title_box).build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        // The header controls only raise the navigate action; the route
        // change happens in its handler.
        let nav_box = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        let mut nav_buttons = Vec::new();
        for route in [Route::About, Route::Settings, Route::Score] {
            let button = gtk::Button::with_label(route.title());
            button.add_css_class("nav-link");
            button.add_css_class("flat");
            button.connect_clicked({
                let app = app.clone();
                move |_| {
                    app.activate_action("navigate", Some(&route.name().to_variant()));
                }
            });
            nav_box.append(&button);
            nav_buttons.push((route, button));
        }
        header.pack_start(&nav_box);

        let register_button = gtk::Button::with_label("Register");
        register_button.add_css_class("register-button");
        register_button.set_tooltip_text(Some("Register a player"));
        register_button.connect_clicked({
            let state = state.clone();
            move |_| {
                popup::show_registration_popup(&state);
            }
        });

        let play_link = gtk::Button::with_label("Play");
        play_link.add_css_class("play-link");
        play_link.add_css_class("suggested-action");
        play_link.set_visible(false);
        play_link.connect_clicked({
            let app = app.clone();
            move |_| {
                app.activate_action("navigate", Some(&Route::Play.name().to_variant()));
            }
        });

        let menu_model = gio::Menu::new();
        menu_model.append(Some("Instructions"), Some("app.instructions"));
        menu_model.append(Some("About Matchup"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        end_box.append(&register_button);
        end_box.append(&play_link);
        end_box.append(&menu_button);
        header.pack_end(&end_box);

        let content_root = gtk::Box::new(gtk::Orientation::Vertical, 0);
        content_root.set_hexpand(true);
        content_root.set_vexpand(true);

        let scroller = gtk::ScrolledWindow::new();
        scroller.set_policy(gtk::PolicyType::Never, gtk::PolicyType::Automatic);
        scroller.set_hexpand(true);
        scroller.set_vexpand(true);
        scroller.set_child(Some(&content_root));

        let overlay = gtk::Overlay::new();
        overlay.set_child(Some(&scroller));
        let popup_layer = popup::build_popup_layer(&state);
        overlay.add_overlay(&popup_layer);

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&overlay));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Matchup")
            .icon_name("io.basshift.matchup")
            .default_width(860)
            .default_height(680)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);
        win.add_css_class("app-window");

        let style_manager = adw::StyleManager::default();
        if style_manager.is_dark() {
            win.add_css_class("theme-dark");
        } else {
            win.add_css_class("theme-light");
        }
        style_manager.connect_notify_local(Some("dark"), {
            let win = win.clone();
            move |manager, _| {
                if manager.is_dark() {
                    win.remove_css_class("theme-light");
                    win.add_css_class("theme-dark");
                } else {
                    win.remove_css_class("theme-dark");
                    win.add_css_class("theme-light");
                }
            }
        });

        {
            let mut st = state.borrow_mut();
            st.content_root = Some(content_root);
            st.title_subtitle = Some(title_subtitle);
            st.nav_buttons = nav_buttons;
            st.register_button = Some(register_button);
            st.play_link = Some(play_link);
            st.dynamic_css_provider = Some(dynamic_css_provider);
        }

        let global_key = gtk::EventControllerKey::new();
        global_key.set_propagation_phase(gtk::PropagationPhase::Capture);
        global_key.connect_key_pressed({
            let state = state.clone();
            let app = app.clone();
            move |_, key, _, _| {
                if key == gdk::Key::Escape {
                    let st = state.borrow();
                    let popup_open = st
                        .popup_box
                        .as_ref()
                        .is_some_and(|popup| popup.is_visible());
                    if popup_open {
                        if let Some(popup) = &st.popup_box {
                            popup.set_visible(false);
                        }
                        return glib::Propagation::Stop;
                    }
                    if st.active_route == Route::Play && !st.lock_input {
                        drop(st);
                        app.activate_action("navigate", Some(&Route::About.name().to_variant()));
                        return glib::Propagation::Stop;
                    }
                }
                glib::Propagation::Proceed
            }
        });
        win.add_controller(global_key);

        initialize(&state);
        win.present();
    });

    app.run();
}

fn load_css() {
    static RESOURCES_INIT: Once = Once::new();
    RESOURCES_INIT.call_once(|| {
        gio::resources_register_include!("matchup.gresource")
            .expect("failed to register embedded resources");
    });

    let Some(display) = gdk::Display::default() else {
        return;
    };

    let icon_theme = gtk::IconTheme::for_display(&display);
    icon_theme.add_resource_path("/io/basshift/Matchup/icons/hicolor");

    for resource_path in [
        "/io/basshift/Matchup/style.vars.css",
        "/io/basshift/Matchup/style.css",
        "/io/basshift/Matchup/style.light.css",
        "/io/basshift/Matchup/style.dark.css",
        "/io/basshift/Matchup/style.mobile.css",
    ] {
        let provider = gtk::CssProvider::new();
        provider.load_from_resource(resource_path);
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::Tile;
    use super::*;

    fn state_with_tiles(values: &[&str]) -> AppState {
        let mut st = AppState::new();
        for value in values {
            st.tiles.push(Tile {
                value: value.to_string(),
                status: TileStatus::Flipped,
            });
        }
        st
    }

    #[test]
    fn a_single_flip_continues_the_turn() {
        let st = state_with_tiles(&["Animals/🐶", "Animals/🐱"]);
        assert!(matches!(
            evaluate_flip_outcome(&st, &[0], 0),
            FlipOutcome::Continue
        ));
    }

    #[test]
    fn two_equal_faces_complete_a_match() {
        let st = state_with_tiles(&["Animals/🐶", "Animals/🐶"]);
        assert!(matches!(
            evaluate_flip_outcome(&st, &[0, 1], 1),
            FlipOutcome::CompleteMatch
        ));
    }

    #[test]
    fn two_different_faces_are_a_mismatch() {
        let st = state_with_tiles(&["Animals/🐶", "Animals/🐱"]);
        assert!(matches!(
            evaluate_flip_outcome(&st, &[0, 1], 1),
            FlipOutcome::Mismatch
        ));
    }
}
