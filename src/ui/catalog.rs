use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::state::Settings;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeEntry {
    pub category: String,
    pub images: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoundPlan {
    pub theme: String,
    pub paths: Vec<String>,
}

#[derive(Debug)]
pub enum CatalogError {
    Read(glib::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Read(err) => write!(f, "could not read the theme catalog: {err}"),
            CatalogError::Parse(err) => write!(f, "theme catalog is not valid JSON: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {}

fn catalog_path() -> PathBuf {
    glib::user_config_dir().join("matchup").join("catalog.json")
}

const SEED_ANIMALS: [&str; 18] = [
    "🐶", "🐱", "🦊", "🐸", "🦉", "🐙", "🦋", "🐝", "🐢", "🦀", "🐠", "🦜", "🦔", "🐳", "🐺",
    "🦁", "🐯", "🐼",
];

const SEED_FRUITS: [&str; 18] = [
    "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🫐", "🍒", "🍑", "🥭", "🍍", "🥥", "🥝",
    "🍈", "🍏", "🍅",
];

const SEED_FOOD: [&str; 18] = [
    "🍕", "🍔", "🍟", "🌭", "🥪", "🌮", "🌯", "🥗", "🍝", "🍜", "🍣", "🍱", "🥟", "🍤", "🍙",
    "🥐", "🥨", "🧀",
];

const SEED_SPORTS: [&str; 18] = [
    "⚽", "🏀", "🏈", "⚾", "🎾", "🏐", "🏉", "🎱", "🏓", "🏸", "🥅", "⛳", "🏒", "🏑", "🥍",
    "🎳", "🥊", "🛹",
];

fn seed_theme(category: &str, images: &[&str]) -> ThemeEntry {
    ThemeEntry {
        category: category.to_string(),
        images: images.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn seed_catalog() -> Vec<ThemeEntry> {
    vec![
        seed_theme("Animals", &SEED_ANIMALS),
        seed_theme("Fruits", &SEED_FRUITS),
        seed_theme("Food", &SEED_FOOD),
        seed_theme("Sports", &SEED_SPORTS),
    ]
}

fn write_seed(path: &Path, entries: &[ThemeEntry]) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match serde_json::to_string_pretty(entries) {
        Ok(json) => {
            let _ = fs::write(path, json);
        }
        Err(err) => eprintln!("[Catalog] failed to serialize the seed catalog: {err}"),
    }
}

pub async fn load_catalog() -> Result<Vec<ThemeEntry>, CatalogError> {
    let path = catalog_path();
    let file = gio::File::for_path(&path);
    match file.load_contents_future().await {
        Ok((bytes, _etag)) => {
            serde_json::from_slice::<Vec<ThemeEntry>>(&bytes).map_err(CatalogError::Parse)
        }
        Err(err) if err.matches(gio::IOErrorEnum::NotFound) => {
            let seeded = seed_catalog();
            write_seed(&path, &seeded);
            Ok(seeded)
        }
        Err(err) => Err(CatalogError::Read(err)),
    }
}

// Out-of-range theme indices clamp to the last entry, fractional pair
// counts round up, and a short theme plays with what it has.
pub fn plan_round(catalog: &[ThemeEntry], settings: &Settings) -> Option<RoundPlan> {
    if catalog.is_empty() {
        eprintln!("[Catalog] no themes available");
        return None;
    }

    let index = settings.theme_index.min(catalog.len() - 1);
    if index != settings.theme_index {
        eprintln!(
            "[Catalog] theme index {} is out of range, using \"{}\"",
            settings.theme_index,
            catalog[index].category
        );
    }
    let theme = &catalog[index];

    let wanted = settings.card_count.ceil().max(0.0) as usize;
    if wanted == 0 {
        eprintln!("[Catalog] round size {} leaves nothing to deal", settings.card_count);
        return None;
    }

    let take = wanted.min(theme.images.len());
    if take == 0 {
        eprintln!("[Catalog] theme \"{}\" has no images", theme.category);
        return None;
    }
    if take < wanted {
        eprintln!(
            "[Catalog] theme \"{}\" holds {} images, trimming the round from {}",
            theme.category,
            theme.images.len(),
            wanted
        );
    }

    let paths = theme
        .images
        .iter()
        .take(take)
        .map(|img| format!("{}/{}", theme.category, img))
        .collect();

    Some(RoundPlan {
        theme: theme.category.clone(),
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(category: &str, images: &[&str]) -> ThemeEntry {
        seed_theme(category, images)
    }

    fn settings(card_count: f64, theme_index: usize) -> Settings {
        Settings {
            card_count,
            theme_index,
        }
    }

    #[test]
    fn plan_round_takes_the_first_images_in_catalog_order() {
        let catalog = vec![theme(
            "animals",
            &["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"],
        )];
        let plan = plan_round(&catalog, &settings(8.0, 0)).unwrap();

        assert_eq!(plan.theme, "animals");
        assert_eq!(
            plan.paths,
            vec![
                "animals/a",
                "animals/b",
                "animals/c",
                "animals/d",
                "animals/e",
                "animals/f",
                "animals/g",
                "animals/h",
            ]
        );
    }

    #[test]
    fn plan_round_rounds_fractional_counts_up() {
        let catalog = seed_catalog();
        let plan = plan_round(&catalog, &settings(12.5, 0)).unwrap();
        assert_eq!(plan.paths.len(), 13);
    }

    #[test]
    fn plan_round_clamps_the_theme_index_to_the_last_entry() {
        let catalog = vec![theme("first", &["a", "b"]), theme("second", &["x", "y"])];
        let plan = plan_round(&catalog, &settings(2.0, 9)).unwrap();
        assert_eq!(plan.theme, "second");
        assert_eq!(plan.paths, vec!["second/x", "second/y"]);
    }

    #[test]
    fn plan_round_trims_requests_beyond_the_theme() {
        let catalog = vec![theme("tiny", &["a", "b", "c"])];
        let plan = plan_round(&catalog, &settings(18.0, 0)).unwrap();
        assert_eq!(plan.paths.len(), 3);
    }

    #[test]
    fn plan_round_skips_themes_without_images() {
        let catalog = vec![theme("bare", &[])];
        assert!(plan_round(&catalog, &settings(8.0, 0)).is_none());
    }

    #[test]
    fn plan_round_with_an_empty_catalog_yields_nothing() {
        assert!(plan_round(&[], &settings(8.0, 0)).is_none());
    }

    #[test]
    fn seed_catalog_covers_the_largest_round() {
        for entry in seed_catalog() {
            assert!(
                entry.images.len() >= 18,
                "theme {} is too small for a 6 x 6 round",
                entry.category
            );
        }
    }

    #[test]
    fn seed_catalog_images_are_distinct_within_a_theme() {
        for entry in seed_catalog() {
            let mut seen = entry.images.clone();
            seen.sort();
            seen.dedup();
            assert_eq!(
                seen.len(),
                entry.images.len(),
                "duplicate face in theme {}",
                entry.category
            );
        }
    }

    #[test]
    fn catalog_entries_survive_a_json_round_trip() {
        let catalog = seed_catalog();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Vec<ThemeEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }
}
