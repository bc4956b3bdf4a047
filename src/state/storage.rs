//! Durable key-value storage for persisted state.
//!
//! The store itself never touches storage; the auto-save and preference
//! persisters write through this trait.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, StoreError};

/// Extension of entries written by `FileStorage`.
const ENTRY_EXTENSION: &str = "json";

/// Minimal string key-value storage.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory storage, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Use `root` as the storage directory, creating it if needed.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.exists() {
            fs::create_dir_all(root).map_err(|e| StoreError::DirectoryCreate {
                path: root.to_path_buf(),
                source: e,
            })?;
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION)
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| StoreError::StorageRead {
            path: path.clone(),
            source: e,
        })?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        // Write to a sibling temp file first so a crash never leaves a torn entry.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(|e| StoreError::StorageWrite {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| StoreError::StorageWrite {
            path: path.clone(),
            source: e,
        })?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StoreError::StorageWrite {
                path: path.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Keys become file names, so only `[A-Za-z0-9._-]` is allowed and they
/// may not start with a dot.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_case::test_case;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.get("a").unwrap().is_none());
        storage.set("a", "1").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
        storage.remove("a").unwrap();
        storage.remove("a").unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_file_storage_creates_dir_and_lists_keys() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("nested").join("store");
        let mut storage = FileStorage::open(&root).unwrap();
        assert!(root.exists());

        storage.set("layerstack-ui", "{}").unwrap();
        storage.set("layerstack-autosave", "{\"version\":1}").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            storage.keys().unwrap(),
            vec!["layerstack-autosave".to_string(), "layerstack-ui".to_string()]
        );
        assert_eq!(
            storage.get("layerstack-autosave").unwrap().as_deref(),
            Some("{\"version\":1}")
        );
        assert!(!root.join("layerstack-ui.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_overwrite_and_remove() {
        let temp = tempdir().unwrap();
        let mut storage = FileStorage::open(temp.path()).unwrap();
        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
        storage.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test_case("" ; "empty")]
    #[test_case("../escape" ; "parent dir")]
    #[test_case(".hidden" ; "leading dot")]
    #[test_case("a/b" ; "separator")]
    #[test_case("with space" ; "space")]
    fn test_invalid_keys_rejected(key: &str) {
        let temp = tempdir().unwrap();
        let mut storage = FileStorage::open(temp.path()).unwrap();
        let err = storage.set(key, "x").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_KEY");
        assert!(storage.get(key).is_err());
    }
}
