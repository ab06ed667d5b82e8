use std::collections::HashMap;
use std::path::PathBuf;

/// Synchronous string key-value persistence.
///
/// The notice controller only needs a single flag, but taking the storage
/// surface as a trait keeps it testable without touching the filesystem.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>>;
    fn remove(&mut self, key: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// A flat JSON string map persisted to a single file.
///
/// Entries are loaded once at open and written through on every mutation.
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// An in-memory store for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("database-notice-dismissed"), None);
        store.set("database-notice-dismissed", "true").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("database-notice-dismissed"),
            Some("true".to_string())
        );
    }

    #[test]
    fn file_store_remove_deletes_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("flag", "true").unwrap();
        store.remove("flag").unwrap();
        // Removing an absent key is a no-op.
        store.remove("flag").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("flag"), None);
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        store.set("flag", "true").unwrap();
        assert_eq!(store.get("flag"), Some("true".to_string()));
        store.remove("flag").unwrap();
        assert_eq!(store.get("flag"), None);
    }
}
