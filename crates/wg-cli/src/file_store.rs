//! A JSON file as a [`KeyValueStore`].
//!
//! The file is one JSON object mapping storage keys to JSON-encoded strings,
//! the same shape as a dump of the builder page's `localStorage`:
//!
//! ```json
//! { "canvas-bg-color": "\"#FFFFFF\"", "canvas-elements": "[...]" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use wg_core::StorageError;
use wg_core::storage::KeyValueStore;

pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`. A missing file is an empty store; it is created on the
    /// first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                StorageError::Backend(format!("{}: not a storage dump: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} does not exist yet", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(StorageError::Backend(format!("{}: {e}", path.display()))),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| StorageError::Backend(format!("{}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use wg_core::storage::{BACKGROUND_KEY, ELEMENTS_KEY, load_state, save_background};

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("missing.json")).unwrap();
        assert_eq!(store.get(ELEMENTS_KEY).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn writes_through_and_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.json");
        let mut store = FileStore::open(&path).unwrap();
        save_background(&mut store, "#101010").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(BACKGROUND_KEY).unwrap().as_deref(), Some("\"#101010\""));
        assert_eq!(load_state(&reopened).scene.background(), "#101010");
    }

    #[test]
    fn reads_browser_dump() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.json");
        fs::write(
            &path,
            r##"{"canvas-bg-color":"\"#ABCDEF\"","canvas-elements":"not json"}"##,
        )
        .unwrap();
        let state = load_state(&FileStore::open(&path).unwrap());
        assert_eq!(state.scene.background(), "#ABCDEF");
        assert!(state.scene.is_empty());
    }

    #[test]
    fn rejects_non_object_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("array.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StorageError::Backend(_))));
    }
}
