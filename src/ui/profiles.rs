use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const STORE_VERSION: u32 = 1;
const STORE_NAME: &str = "profiles";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub created: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub key: u32,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    store: String,
    next_key: u32,
    profiles: Vec<StoredProfile>,
}

#[derive(Debug)]
pub enum StoreError {
    Serialize(serde_json::Error),
    Write(io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Serialize(err) => write!(f, "could not serialize the profile store: {err}"),
            StoreError::Write(err) => write!(f, "could not write the profile store: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub struct ProfileStore {
    path: PathBuf,
    next_key: u32,
    profiles: Vec<StoredProfile>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        ProfileStore {
            path: PathBuf::new(),
            next_key: 1,
            profiles: Vec::new(),
        }
    }
}

pub fn default_store_path() -> PathBuf {
    glib::user_config_dir().join("matchup").join("profiles.json")
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl ProfileStore {
    pub fn open(path: PathBuf) -> ProfileStore {
        let loaded = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<StoreFile>(&bytes) {
                Ok(file) if file.version == STORE_VERSION && file.store == STORE_NAME => Some(file),
                Ok(file) => {
                    eprintln!(
                        "[Profiles] {} is a \"{}\" store at version {}, starting fresh",
                        path.display(),
                        file.store,
                        file.version
                    );
                    None
                }
                Err(err) => {
                    eprintln!(
                        "[Profiles] could not parse {}: {err}, starting fresh",
                        path.display()
                    );
                    None
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                eprintln!("[Profiles] could not read {}: {err}", path.display());
                None
            }
        };

        match loaded {
            Some(file) => ProfileStore {
                path,
                next_key: file.next_key,
                profiles: file.profiles,
            },
            None => ProfileStore {
                path,
                ..ProfileStore::default()
            },
        }
    }

    pub fn profiles(&self) -> &[StoredProfile] {
        &self.profiles
    }

    // Memory picks up the new entry only after the bytes reached disk, so
    // a failed write leaves the store as it was.
    pub fn add(&mut self, profile: Profile) -> Result<u32, StoreError> {
        let key = self.next_key;
        let mut file = StoreFile {
            version: STORE_VERSION,
            store: STORE_NAME.to_string(),
            next_key: key.saturating_add(1),
            profiles: self.profiles.clone(),
        };
        file.profiles.push(StoredProfile { key, profile });

        let json = serde_json::to_string_pretty(&file).map_err(StoreError::Serialize)?;
        write_atomic(&self.path, json.as_bytes()).map_err(StoreError::Write)?;

        self.next_key = file.next_key;
        self.profiles = file.profiles;
        Ok(key)
    }
}

pub fn now_date_label() -> String {
    glib::DateTime::now_local()
        .ok()
        .and_then(|dt| dt.format("%Y-%m-%d %H:%M").ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    fn sample(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            surname: "Tester".to_string(),
            email: format!("{name}@example.com"),
            created: "2026-01-01 12:00".to_string(),
        }
    }

    #[test]
    fn add_assigns_sequential_keys_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("profiles.json");

        let mut store = ProfileStore::open(path.clone());
        assert_eq!(store.add(sample("Ada")).unwrap(), 1);
        assert_eq!(store.add(sample("Grace")).unwrap(), 2);

        let reopened = ProfileStore::open(path);
        assert_eq!(reopened.profiles().len(), 2);
        assert_eq!(reopened.next_key, 3);
        assert_eq!(reopened.profiles()[0].key, 1);
        assert_eq!(reopened.profiles()[0].profile.name, "Ada");
        assert_eq!(reopened.profiles()[1].key, 2);
        assert_eq!(reopened.profiles()[1].profile.name, "Grace");
    }

    #[test]
    fn open_with_a_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.child("absent.json"));
        assert!(store.profiles().is_empty());
        assert_eq!(store.next_key, 1);
    }

    #[test]
    fn open_discards_a_damaged_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("profiles.json");
        fs::write(&path, b"not json at all").unwrap();

        let store = ProfileStore::open(path);
        assert!(store.profiles().is_empty());
        assert_eq!(store.next_key, 1);
    }

    #[test]
    fn open_discards_a_foreign_store_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("profiles.json");
        fs::write(
            &path,
            r#"{"version":99,"store":"profiles","next_key":7,"profiles":[]}"#,
        )
        .unwrap();

        let store = ProfileStore::open(path);
        assert!(store.profiles().is_empty());
        assert_eq!(store.next_key, 1);
    }

    #[test]
    fn a_failed_write_leaves_the_store_untouched() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.child("blocker");
        fs::write(&blocker, b"plain file").unwrap();

        let mut store = ProfileStore::open(blocker.join("profiles.json"));
        let result = store.add(sample("Ada"));

        assert!(matches!(result, Err(StoreError::Write(_))));
        assert!(store.profiles().is_empty());
        assert_eq!(store.next_key, 1);
    }

    #[test]
    fn stored_profiles_keep_flat_json_fields() {
        let json = serde_json::to_string(&StoredProfile {
            key: 4,
            profile: sample("Ada"),
        })
        .unwrap();
        assert!(json.contains("\"key\":4"));
        assert!(json.contains("\"name\":\"Ada\""));
        assert!(!json.contains("\"profile\""));
    }

    #[test]
    fn now_date_label_reads_like_a_timestamp() {
        let label = now_date_label();
        assert!(label.contains('-'));
        assert!(label.contains(':'));
    }
}
