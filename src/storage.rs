//! Durable string key-value storage.
//!
//! [`FileStore`] keeps every entry in one JSON object on disk and replaces the
//! file on each mutation, so a write has landed before the call returns.
//! Replacement goes through a sibling temp file and a rename; an interrupted
//! write leaves the previous file intact.

use crate::error::{AppError, Result};
use log::{debug, error};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the persisted state inside the storage directory.
pub const STORAGE_FILENAME: &str = "storage.json";

/// Suffix given to an unreadable state file when it is set aside.
pub const CORRUPT_SUFFIX: &str = "corrupt";

/// Minimal string-to-string storage contract.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    /// All keys currently stored, in ascending order.
    fn keys(&self) -> Vec<String>;
}

/// In-memory store, used by tests and as the cache behind [`FileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Store backed by a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or start) the store file inside `dir`.
    ///
    /// A missing file yields an empty store; the file is only created on the
    /// first write.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(STORAGE_FILENAME);

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        debug!("Opened {} with {} keys", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    /// Like [`FileStore::open`], but a file that does not parse is renamed to
    /// `storage.json.corrupt` and the store starts empty.
    pub fn open_or_recover(dir: &Path) -> Result<Self> {
        match Self::open(dir) {
            Err(AppError::Parse(reason)) => {
                let path = dir.join(STORAGE_FILENAME);
                let aside = dir.join(format!("{}.{}", STORAGE_FILENAME, CORRUPT_SUFFIX));
                error!(
                    "{} is unreadable ({}); moved to {}, starting empty",
                    path.display(),
                    reason,
                    aside.display()
                );
                fs::rename(&path, &aside)?;
                Ok(Self {
                    path,
                    entries: BTreeMap::new(),
                })
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(&self.entries)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| AppError::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// On a failed write the entry is restored, so memory matches disk.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.entries.remove(key) {
            if let Err(e) = self.flush() {
                self.entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        store.remove("a").unwrap();
        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store_persists_each_write() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = FileStore::open(dir.path()).unwrap();
            assert!(!store.path().exists());
            store.set("playback-1-0-0", "12.5").unwrap();
            assert!(store.path().exists());
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("playback-1-0-0").as_deref(), Some("12.5"));
    }

    #[test]
    fn test_file_store_remove_is_durable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("missing").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert!(reopened.keys().is_empty());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILENAME), "not json").unwrap();
        assert!(FileStore::open(dir.path()).is_err());
    }

    #[test]
    fn test_truncated_file_is_set_aside() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.set("favorites-42", r#"[{"podcastId":"42","seasonIndex":0,"episodeIndex":1}]"#).unwrap();
            store.set("playback-42-0-0", "37.5").unwrap();
        }

        // interrupted write: only the first half made it to disk
        let path = dir.path().join(STORAGE_FILENAME);
        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, &content[..content.len() / 2]).unwrap();
        assert!(FileStore::open(dir.path()).is_err());

        let mut store = FileStore::open_or_recover(dir.path()).unwrap();
        assert!(store.keys().is_empty());
        let aside = dir.path().join(format!("{}.{}", STORAGE_FILENAME, CORRUPT_SUFFIX));
        assert_eq!(fs::read_to_string(aside).unwrap(), &content[..content.len() / 2]);

        store.set("playback-42-0-0", "1.0").unwrap();
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("playback-42-0-0").as_deref(), Some("1.0"));
    }

    #[test]
    fn test_writes_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        for i in 0..20 {
            store.set("playback-1-0-0", &i.to_string()).unwrap();
        }
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(STORAGE_FILENAME)]);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");
        let mut store = FileStore::open(&state_dir).unwrap();
        store.set("kept", "1").unwrap();

        // a plain file where the directory should be makes every flush fail
        fs::remove_dir_all(&state_dir).unwrap();
        fs::write(&state_dir, "").unwrap();

        assert!(store.set("kept", "2").is_err());
        assert!(store.set("new", "x").is_err());
        assert!(store.remove("kept").is_err());
        assert_eq!(store.get("kept").as_deref(), Some("1"));
        assert!(store.get("new").is_none());
    }
}
