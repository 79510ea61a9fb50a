use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hashbrown::HashMap;
use log::{debug, warn};

use super::source::tile_file;
use crate::{Error, TileKey};

/// Raw tile payloads keyed by [`TileKey`].
///
/// Payloads live in memory and, when a directory is configured, are written
/// through to `dir/{z}/{x}/{y}.json` so that a later process can reuse them.
#[derive(Debug, Default)]
pub struct TileCache {
    entries: Mutex<HashMap<TileKey, Arc<str>>>,
    dir: Option<PathBuf>,
}

impl TileCache {
    /// Memory-only cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache backed by a directory, created on first write
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            entries: Mutex::default(),
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Payload of `key` from memory, falling back to the cache directory.
    ///
    /// An unreadable cache file counts as a miss.
    pub fn get(&self, key: TileKey) -> Result<Option<Arc<str>>, Error> {
        if let Some(payload) = self.lock()?.get(&key) {
            return Ok(Some(Arc::clone(payload)));
        }

        let Some(dir) = &self.dir else {
            return Ok(None);
        };
        let path = tile_file(dir, key);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!("Tile {key} restored from {}", path.display());
                let payload: Arc<str> = Arc::from(text);
                self.lock()?.insert(key, Arc::clone(&payload));
                Ok(Some(payload))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!("Could not read cached tile {key} from {}: {e}", path.display());
                Ok(None)
            }
        }
    }

    pub fn contains(&self, key: TileKey) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    /// Stores a payload. A failing disk write only costs persistence, the
    /// in-memory entry is kept either way.
    pub fn insert(&self, key: TileKey, payload: &str) -> Result<Arc<str>, Error> {
        let payload: Arc<str> = Arc::from(payload);
        self.lock()?.insert(key, Arc::clone(&payload));

        if let Some(dir) = &self.dir {
            let path = tile_file(dir, key);
            let written = path
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .and_then(|()| std::fs::write(&path, payload.as_bytes()));
            if let Err(e) = written {
                warn!("Could not persist tile {key} to {}: {e}", path.display());
            }
        }
        Ok(payload)
    }

    /// Drops a payload from memory and disk, returns whether it was cached.
    /// A file that cannot be deleted is logged and left behind.
    pub fn remove(&self, key: TileKey) -> Result<bool, Error> {
        let mut removed = self.lock()?.remove(&key).is_some();
        if let Some(dir) = &self.dir {
            let path = tile_file(dir, key);
            match std::fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("Could not delete cached tile {key} at {}: {e}", path.display());
                }
            }
        }
        Ok(removed)
    }

    /// Number of payloads held in memory
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<TileKey, Arc<str>>>, Error> {
        self.entries.lock().map_err(|_| Error::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let cache = TileCache::new();
        let key = TileKey::new(1, 2, 3);
        assert!(cache.get(key).unwrap().is_none());

        cache.insert(key, "{}").unwrap();
        assert_eq!(cache.get(key).unwrap().as_deref(), Some("{}"));
        assert_eq!(cache.len(), 1);

        assert!(cache.remove(key).unwrap());
        assert!(cache.is_empty());
    }

    #[test]
    fn directory_survives_a_new_cache() {
        let dir = tempfile::tempdir().unwrap();
        let key = TileKey::new(10, 20, 5);

        TileCache::with_dir(dir.path()).insert(key, "payload").unwrap();
        assert!(dir.path().join("5").join("10").join("20.json").exists());

        let reopened = TileCache::with_dir(dir.path());
        assert!(reopened.is_empty());
        assert_eq!(reopened.get(key).unwrap().as_deref(), Some("payload"));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn unreadable_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let key = TileKey::new(10, 20, 5);
        // A directory where the payload file belongs fails every read
        std::fs::create_dir_all(dir.path().join("5").join("10").join("20.json")).unwrap();

        let cache = TileCache::with_dir(dir.path());
        assert!(cache.get(key).unwrap().is_none());
        assert!(!cache.remove(key).unwrap());

        cache.insert(key, "payload").unwrap();
        assert_eq!(cache.get(key).unwrap().as_deref(), Some("payload"));
    }
}
