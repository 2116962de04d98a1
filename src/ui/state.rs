use gtk4 as gtk;

use super::catalog::ThemeEntry;
use super::profiles::ProfileStore;
use super::routes::Route;

#[derive(Clone, Debug, PartialEq)]
pub enum TileStatus {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub value: String,
    pub status: TileStatus,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub card_count: f64,
    pub theme_index: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            card_count: 8.0,
            theme_index: 0,
        }
    }
}

// Scratch only; the profile store owns the durable records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserData {
    pub name: String,
    pub surname: String,
    pub mail: String,
    pub img: String,
    pub score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PopupPhase {
    #[default]
    Register,
    Ready,
}

impl PopupPhase {
    // One-way; there is no transition back to the register prompt.
    pub fn advanced(self) -> Self {
        PopupPhase::Ready
    }
}

pub fn card_span(card_count: f64) -> &'static str {
    if card_count == 12.5 {
        "18%"
    } else if card_count == 18.0 {
        "13%"
    } else {
        "22%"
    }
}

pub fn span_columns(span: &str) -> i32 {
    match span {
        "18%" => 5,
        "13%" => 7,
        _ => 4,
    }
}

// Odd board sides give fractional pair counts (5 -> 12.5); those stay
// legal values all the way to the deal.
pub fn recompute_card_count(side_value: f64) -> f64 {
    (side_value * side_value) / 2.0
}

pub fn round_score(pairs: usize, seconds: u32, mismatches: u32) -> u32 {
    let penalty = seconds
        .saturating_mul(5)
        .saturating_add(mismatches.saturating_mul(10));
    (pairs as u32).saturating_mul(100).saturating_sub(penalty)
}

pub struct AppState {
    pub content_root: Option<gtk::Box>,
    pub title_subtitle: Option<gtk::Label>,
    pub nav_buttons: Vec<(Route, gtk::Button)>,
    pub register_button: Option<gtk::Button>,
    pub play_link: Option<gtk::Button>,
    pub popup_box: Option<gtk::Box>,
    pub name_entry: Option<gtk::Entry>,
    pub surname_entry: Option<gtk::Entry>,
    pub email_entry: Option<gtk::Entry>,
    pub board_container: Option<gtk::Box>,
    pub win_banner: Option<gtk::Box>,
    pub win_banner_label: Option<gtk::Label>,
    pub dynamic_css_provider: Option<gtk::CssProvider>,

    // Session state
    pub settings: Settings,
    pub user_data: UserData,
    pub popup_phase: PopupPhase,
    pub active_route: Route,
    pub profile_store: ProfileStore,
    pub catalog: Vec<ThemeEntry>,

    // Round state
    pub tiles: Vec<Tile>,
    pub flipped_indices: Vec<usize>,
    pub grid_buttons: Vec<gtk::Button>,
    pub lock_input: bool,
    pub flip_anim_phase: bool,
    pub game_id: u64,
    pub grid_cols: i32,
    pub grid_rows: i32,
    pub card_span: &'static str,
    pub round_theme: String,
    pub seconds_elapsed: u32,
    pub timer_handle: Option<glib::SourceId>,
    pub run_mismatches: u32,
    pub run_matches: u32,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            content_root: None,
            title_subtitle: None,
            nav_buttons: Vec::new(),
            register_button: None,
            play_link: None,
            popup_box: None,
            name_entry: None,
            surname_entry: None,
            email_entry: None,
            board_container: None,
            win_banner: None,
            win_banner_label: None,
            dynamic_css_provider: None,
            settings: Settings::default(),
            user_data: UserData::default(),
            popup_phase: PopupPhase::default(),
            active_route: Route::default(),
            profile_store: ProfileStore::default(),
            catalog: Vec::new(),
            tiles: Vec::new(),
            flipped_indices: Vec::new(),
            grid_buttons: Vec::new(),
            lock_input: false,
            flip_anim_phase: false,
            game_id: 0,
            grid_cols: span_columns(card_span(8.0)),
            grid_rows: 0,
            card_span: card_span(8.0),
            round_theme: String::new(),
            seconds_elapsed: 0,
            timer_handle: None,
            run_mismatches: 0,
            run_matches: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // The last grid row is padded with pre-matched filler so the tile list
    // always covers grid_cols * grid_rows cells. game_id is bumped at the
    // round entry points, not here.
    pub fn reset_round(&mut self, paths: &[String]) {
        self.tiles.clear();
        self.flipped_indices.clear();
        self.lock_input = false;
        self.run_mismatches = 0;
        self.run_matches = 0;

        let mut deck: Vec<String> = Vec::with_capacity(paths.len() * 2);
        for path in paths {
            deck.push(path.clone());
            deck.push(path.clone());
        }

        use rand::seq::SliceRandom;
        let mut rng = rand::rng();
        deck.shuffle(&mut rng);

        self.grid_cols = span_columns(self.card_span);
        let total = deck.len() as i32;
        self.grid_rows = if total == 0 {
            0
        } else {
            (total + self.grid_cols - 1) / self.grid_cols
        };

        for value in deck {
            self.tiles.push(Tile {
                status: TileStatus::Hidden,
                value,
            });
        }

        let filler = (self.grid_cols * self.grid_rows - total).max(0);
        for _ in 0..filler {
            self.tiles.push(Tile {
                status: TileStatus::Matched,
                value: String::new(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_span_maps_supported_sizes() {
        assert_eq!(card_span(8.0), "22%");
        assert_eq!(card_span(12.5), "18%");
        assert_eq!(card_span(18.0), "13%");
    }

    #[test]
    fn card_span_falls_back_to_base_layout() {
        assert_eq!(card_span(0.0), "22%");
        assert_eq!(card_span(7.9), "22%");
        assert_eq!(card_span(32.0), "22%");
        assert_eq!(card_span(-3.0), "22%");
    }

    #[test]
    fn card_count_recompute_halves_the_square() {
        assert_eq!(recompute_card_count(8.0), 32.0);
        assert_eq!(recompute_card_count(4.0), 8.0);
        assert_eq!(recompute_card_count(5.0), 12.5);
        assert_eq!(recompute_card_count(6.0), 18.0);
    }

    #[test]
    fn popup_phase_only_moves_forward() {
        assert_eq!(PopupPhase::Register.advanced(), PopupPhase::Ready);
        assert_eq!(PopupPhase::Ready.advanced(), PopupPhase::Ready);
    }

    #[test]
    fn reset_round_builds_a_pair_per_path() {
        let mut st = AppState::new();
        let paths: Vec<String> = ["animals/🐶", "animals/🐱", "animals/🦊"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        st.reset_round(&paths);

        assert_eq!(st.grid_cols, 4);
        assert_eq!(st.grid_rows, 2);
        assert_eq!(st.tiles.len(), 8);
        for path in &paths {
            let copies = st.tiles.iter().filter(|t| &t.value == path).count();
            assert_eq!(copies, 2, "expected a pair for {path}");
        }

        let filler: Vec<&Tile> = st.tiles.iter().filter(|t| t.value.is_empty()).collect();
        assert_eq!(filler.len(), 2);
        assert!(filler.iter().all(|t| t.status == TileStatus::Matched));
        assert!(
            st.tiles
                .iter()
                .filter(|t| !t.value.is_empty())
                .all(|t| t.status == TileStatus::Hidden)
        );
    }

    #[test]
    fn reset_round_with_no_paths_leaves_an_empty_board() {
        let mut st = AppState::new();
        st.reset_round(&[]);
        assert!(st.tiles.is_empty());
        assert_eq!(st.grid_rows, 0);
    }

    #[test]
    fn reset_round_uses_the_stored_card_span() {
        let mut st = AppState::new();
        st.card_span = card_span(18.0);
        let paths: Vec<String> = (0..18).map(|i| format!("sports/{i}")).collect();
        st.reset_round(&paths);

        assert_eq!(st.grid_cols, 7);
        assert_eq!(st.grid_rows, 6);
        assert_eq!(st.tiles.len(), 42);
    }

    #[test]
    fn round_score_floors_at_zero() {
        assert_eq!(round_score(8, 30, 4), 610);
        assert_eq!(round_score(2, 1000, 50), 0);
    }
}
