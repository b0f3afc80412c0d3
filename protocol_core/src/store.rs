//! Key-value persistence for the protocol and activity log.
//!
//! `FileStore` keeps one JSON file per key and writes atomically with file
//! locking; `MemoryStore` is used by tests and embedders that persist elsewhere.

use crate::{Error, Protocol, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Key holding the serialized active protocol
pub const PROTOCOL_KEY: &str = "active_protocol";

/// Key holding the list of dates with training activity
pub const ACTIVITY_KEY: &str = "activity_dates";

/// String key-value persistence collaborator
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Directory-backed store: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::State(format!("Invalid store key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    /// Read a value under a shared lock. Missing file means missing key.
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        read?;

        tracing::debug!("Read {} from {:?}", key, path);
        Ok(Some(contents))
    }

    /// Atomically replace a value by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let temp = NamedTempFile::new_in(&self.dir)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} to {:?}", key, path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Load the active protocol
///
/// Returns `None` if nothing is stored. A corrupted entry is logged and
/// treated as absent rather than failing the session.
pub fn load_protocol(store: &dyn KeyValueStore) -> Result<Option<Protocol>> {
    let Some(contents) = store.get(PROTOCOL_KEY)? else {
        tracing::info!("No active protocol stored");
        return Ok(None);
    };

    match serde_json::from_str::<Protocol>(&contents) {
        Ok(protocol) => {
            tracing::debug!("Loaded protocol '{}'", protocol.title);
            Ok(Some(protocol))
        }
        Err(e) => {
            tracing::warn!("Failed to parse stored protocol: {}. Ignoring it.", e);
            Ok(None)
        }
    }
}

pub fn save_protocol(store: &mut dyn KeyValueStore, protocol: &Protocol) -> Result<()> {
    let contents = serde_json::to_string(protocol)?;
    store.set(PROTOCOL_KEY, &contents)
}

pub fn clear_protocol(store: &mut dyn KeyValueStore) -> Result<()> {
    tracing::info!("Removing active protocol");
    store.remove(PROTOCOL_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn protocol() -> Protocol {
        Protocol::activate("Titan", "Força", "### DIA 1\n- Supino Reto: 3x10", Utc::now())
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::default();
        assert!(load_protocol(&store).unwrap().is_none());

        let p = protocol();
        save_protocol(&mut store, &p).unwrap();
        assert_eq!(load_protocol(&store).unwrap(), Some(p));

        clear_protocol(&mut store).unwrap();
        assert!(load_protocol(&store).unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path().join("data"));

        let mut p = protocol();
        p.completed_days.insert(3);
        save_protocol(&mut store, &p).unwrap();

        let loaded = load_protocol(&store).unwrap().unwrap();
        assert_eq!(loaded, p);
        assert!(temp_dir.path().join("data/active_protocol.json").exists());
    }

    #[test]
    fn test_file_store_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        store.set("activity_dates", "[]").unwrap();
        store.set("activity_dates", "[\"2026-01-01\"]").unwrap();

        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["activity_dates.json".to_string()]);
        assert_eq!(
            store.get("activity_dates").unwrap().as_deref(),
            Some("[\"2026-01-01\"]")
        );
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        assert!(store.remove(PROTOCOL_KEY).is_ok());
        assert!(store.get(PROTOCOL_KEY).unwrap().is_none());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        assert!(matches!(store.set("../escape", "x"), Err(Error::State(_))));
        assert!(store.get("").is_err());
    }

    #[test]
    fn test_corrupted_protocol_loads_as_none() {
        let mut store = MemoryStore::default();
        store.set(PROTOCOL_KEY, "{ invalid json }").unwrap();
        assert!(load_protocol(&store).unwrap().is_none());
    }
}
