//! Locally persisted favorites.
//!
//! The whole list is serialized as JSON under a single key and rewritten on
//! every change. Reads fail open: anything that cannot be decoded is treated
//! as "no favorites yet".

use std::{collections::HashMap, fs, io::ErrorKind, path::PathBuf, sync::Arc};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::StoreError, model::City};

/// Storage key holding the serialized favorites list.
pub const FAVORITES_KEY: &str = "favorites";

/// Durable text key-value storage.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One file per key inside a directory: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value for `key`, as written.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Ordered list of saved cities, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    cities: Vec<City>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `city` unless one with the same id is already saved.
    pub fn add(&mut self, city: City) -> bool {
        if self.contains(city.id) {
            return false;
        }
        self.cities.push(city);
        true
    }

    /// Removes the city with `id`; returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| c.id != id);
        self.cities.len() != before
    }

    pub fn contains(&self, id: u64) -> bool {
        self.cities.iter().any(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Drops later duplicates, keeping the first occurrence of each id.
    fn dedup(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.cities.len());
        self.cities.retain(|c| {
            if seen.contains(&c.id) {
                false
            } else {
                seen.push(c.id);
                true
            }
        });
        self
    }
}

impl FromIterator<City> for Favorites {
    fn from_iter<I: IntoIterator<Item = City>>(iter: I) -> Self {
        let mut favorites = Favorites::new();
        for city in iter {
            favorites.add(city);
        }
        favorites
    }
}

pub struct FavoritesStore {
    storage: Box<dyn KeyValueStorage>,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore").finish_non_exhaustive()
    }
}

impl FavoritesStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileStorage::new(dir)))
    }

    /// Favorites that live only as long as this process.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Reads the saved list. Never fails: missing or unreadable data yields
    /// an empty list.
    pub fn load(&self) -> Favorites {
        let raw = match self.storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no saved favorites");
                return Favorites::new();
            }
            Err(e) => {
                warn!(error = %e, "failed to read favorites, starting empty");
                return Favorites::new();
            }
        };

        match serde_json::from_str::<Favorites>(&raw) {
            Ok(favorites) => favorites.dedup(),
            Err(e) => {
                warn!(error = %e, "saved favorites are unreadable, starting empty");
                Favorites::new()
            }
        }
    }

    /// Replaces the saved list with `favorites`.
    pub fn save(&self, favorites: &Favorites) -> Result<(), StoreError> {
        let json = serde_json::to_string(favorites)?;
        self.storage.set(FAVORITES_KEY, &json)
    }
}
