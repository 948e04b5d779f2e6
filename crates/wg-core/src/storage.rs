//! Persistence: the three keyed entries a project lives in.
//!
//! Each entry is stored as a JSON-encoded string under a fixed key, the same
//! layout the browser page keeps in `localStorage`. Entries load
//! independently: a malformed one is logged and falls back to its default
//! without touching the others.

use crate::error::StorageError;
use crate::model::{SavedComponentTemplate, SceneElement};
use crate::scene::{DEFAULT_BACKGROUND, Scene};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

pub const ELEMENTS_KEY: &str = "canvas-elements";
pub const COMPONENTS_KEY: &str = "saved-components";
pub const BACKGROUND_KEY: &str = "canvas-bg-color";

/// A string key/value store (browser `localStorage`, a JSON file, memory).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, used by tests and as a scratch backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ─── Load ────────────────────────────────────────────────────────────────

/// Everything rehydrated at startup.
#[derive(Debug, Clone, Default)]
pub struct PersistedState {
    pub scene: Scene,
    pub library: Vec<SavedComponentTemplate>,
}

/// Rehydrate all three entries. Never fails.
pub fn load_state<S: KeyValueStore + ?Sized>(store: &S) -> PersistedState {
    let elements: Vec<SceneElement> = load_entry(store, ELEMENTS_KEY).unwrap_or_default();
    let library: Vec<SavedComponentTemplate> =
        load_entry(store, COMPONENTS_KEY).unwrap_or_default();
    let background: String =
        load_entry(store, BACKGROUND_KEY).unwrap_or_else(|| DEFAULT_BACKGROUND.to_string());

    log::debug!(
        "loaded {} elements, {} saved components",
        elements.len(),
        library.len()
    );
    PersistedState {
        scene: Scene::new(elements, background),
        library,
    }
}

/// Decode one JSON-encoded entry.
pub fn decode_entry<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Parse {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn load_entry<T: DeserializeOwned, S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::error!("reading '{key}': {e}");
            return None;
        }
    };
    match decode_entry(key, &raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("{e}; using default");
            None
        }
    }
}

// ─── Save ────────────────────────────────────────────────────────────────

pub fn save_elements<S: KeyValueStore + ?Sized>(store: &mut S, scene: &Scene) -> Result<(), StorageError> {
    save_entry(store, ELEMENTS_KEY, scene.elements())
}

pub fn save_library<S: KeyValueStore + ?Sized>(
    store: &mut S,
    library: &[SavedComponentTemplate],
) -> Result<(), StorageError> {
    save_entry(store, COMPONENTS_KEY, library)
}

pub fn save_background<S: KeyValueStore + ?Sized>(store: &mut S, color: &str) -> Result<(), StorageError> {
    save_entry(store, BACKGROUND_KEY, color)
}

fn save_entry<T: Serialize + ?Sized, S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &json)
}
