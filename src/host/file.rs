use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::backend::StorageBackend;
use crate::error::StorageError;

/// A durable origin stored as a single JSON object file.
///
/// The file is re-read on every access so that separate processes sharing
/// it observe each other's writes. Concurrent writers race and the last
/// rename wins. A missing file is an empty origin.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)?;
        debug!(path = %self.path.display(), key, "persisted slot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("prefs.json"));
        assert_eq!(backend.get_item("theme").unwrap(), None);
    }

    #[test]
    fn values_survive_a_new_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let first = FileBackend::new(&path);
        first.set_item("theme", "dark").unwrap();
        first.set_item("recent-tools", r#"["uuid-generator"]"#).unwrap();

        let second = FileBackend::new(&path);
        assert_eq!(second.get_item("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(
            second.get_item("recent-tools").unwrap().as_deref(),
            Some(r#"["uuid-generator"]"#)
        );
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let backend = FileBackend::new(&path);
        assert!(matches!(
            backend.get_item("theme"),
            Err(StorageError::Corrupt(_))
        ));
    }
}
