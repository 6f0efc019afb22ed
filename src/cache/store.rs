use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{CacheError, CacheResult};
use super::types::{CacheEntry, CacheStats};
use crate::constants::DEFAULT_CACHE_TTL;
use crate::hashing::cache_key_hex;

const ENTRY_EXTENSION: &str = "json";

const TEMP_EXTENSION: &str = "tmp";

/// Outcome of decoding one entry file.
enum Probe {
    Valid(CacheEntry),
    Expired,
    Corrupted,
}

#[derive(Debug, Clone)]
/// File-per-entry cache store with lazy expiry.
///
/// The store holds no in-process state besides its root and TTL, so it is `Send + Sync`
/// and can be shared behind an `Arc` by any number of stages without locking.
pub struct CacheStore {
    root: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    /// Creates a store rooted at `root` with the default 24h TTL.
    pub fn new(root: PathBuf) -> Self {
        Self::with_ttl(root, DEFAULT_CACHE_TTL)
    }

    /// Creates a store rooted at `root` with a custom TTL.
    pub fn with_ttl(root: PathBuf, ttl: Duration) -> Self {
        Self { root, ttl }
    }

    /// Creates the store and ensures its root directory exists.
    pub fn open(root: PathBuf, ttl: Duration) -> CacheResult<Self> {
        let store = Self::with_ttl(root, ttl);
        store.ensure_root()?;
        Ok(store)
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn ensure_root(&self) -> CacheResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|_| CacheError::StorageUnavailable {
                path: self.root.clone(),
            })?;
        }
        Ok(())
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    fn category_path(&self, category: &str) -> CacheResult<PathBuf> {
        let valid = !category.is_empty()
            && category != "."
            && category != ".."
            && !category.contains(['/', '\\'])
            && !category.contains('\0');
        if !valid {
            return Err(CacheError::InvalidCategory {
                category: category.to_string(),
            });
        }
        Ok(self.root.join(category))
    }

    fn entry_path(&self, category: &str, key: &str) -> CacheResult<PathBuf> {
        Ok(self
            .category_path(category)?
            .join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }

    /// Returns the payload stored for `(category, query)`, or `None` on a miss.
    ///
    /// Expired and undecodable entries are deleted on the way out and reported as misses.
    pub fn get(&self, category: &str, query: &str) -> Option<serde_json::Value> {
        let key = cache_key_hex(category, query);
        let path = match self.entry_path(category, &key) {
            Ok(p) => p,
            Err(e) => {
                warn!(category = %category, error = %e, "Rejected cache lookup");
                return None;
            }
        };

        match self.probe(&path, Some((category, &key)), now_ms()) {
            Some(Probe::Valid(entry)) => {
                debug!(category = %category, key = %key, "Cache hit");
                Some(entry.payload)
            }
            Some(Probe::Expired) => {
                debug!(category = %category, key = %key, "Cache entry expired, removing");
                remove_quietly(&path);
                None
            }
            Some(Probe::Corrupted) => {
                warn!(path = ?path, "Purging corrupted cache entry");
                remove_quietly(&path);
                None
            }
            None => {
                debug!(category = %category, key = %key, "Cache miss");
                None
            }
        }
    }

    /// Typed variant of [`get`](Self::get).
    ///
    /// A payload that no longer decodes into `T` is purged and reported as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, category: &str, query: &str) -> Option<T> {
        let payload = self.get(category, query)?;
        match serde_json::from_value(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(category = %category, error = %e, "Cached payload has wrong shape, purging");
                self.remove(category, query);
                None
            }
        }
    }

    /// Stores `payload` for `(category, query)` stamped with the current time.
    pub fn set(&self, category: &str, query: &str, payload: serde_json::Value) -> CacheResult<()> {
        self.write_entry(category, query, payload, now_ms())
    }

    /// Serializes `value` and stores it for `(category, query)`.
    pub fn set_as<T: Serialize>(&self, category: &str, query: &str, value: &T) -> CacheResult<()> {
        let payload = serde_json::to_value(value)?;
        self.set(category, query, payload)
    }

    /// Async variant of [`set_as`](Self::set_as) for callers on the runtime.
    ///
    /// Serialization happens inline; the file write, fsync and rename run on the
    /// blocking pool so concurrent stages keep their worker threads.
    pub async fn persist_as<T: Serialize>(
        &self,
        category: &str,
        query: &str,
        value: &T,
    ) -> CacheResult<()> {
        let payload = serde_json::to_value(value)?;
        let store = self.clone();
        let category = category.to_string();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || store.set(&category, &query, payload)).await?
    }

    /// Stores an entry with an explicit write time (Unix milliseconds).
    #[cfg(any(test, feature = "mock"))]
    pub fn set_at(
        &self,
        category: &str,
        query: &str,
        payload: serde_json::Value,
        timestamp_ms: i64,
    ) -> CacheResult<()> {
        self.write_entry(category, query, payload, timestamp_ms)
    }

    /// Returns the on-disk path for `(category, query)`.
    pub fn path_for(&self, category: &str, query: &str) -> CacheResult<PathBuf> {
        self.entry_path(category, &cache_key_hex(category, query))
    }

    /// Removes the entry for `(category, query)`; returns `true` if one existed.
    pub fn remove(&self, category: &str, query: &str) -> bool {
        match self.path_for(category, query) {
            Ok(path) if path.exists() => fs::remove_file(&path).is_ok(),
            _ => false,
        }
    }

    fn write_entry(
        &self,
        category: &str,
        query: &str,
        payload: serde_json::Value,
        timestamp: i64,
    ) -> CacheResult<()> {
        let key = cache_key_hex(category, query);
        let dir = self.category_path(category)?;
        fs::create_dir_all(&dir)?;

        let entry = CacheEntry {
            key: key.clone(),
            timestamp,
            category: category.to_string(),
            query: query.to_string(),
            payload,
        };
        let bytes = serde_json::to_vec(&entry)?;

        let temp_path = dir.join(format!(
            "{}.{}.{}",
            key,
            uuid::Uuid::new_v4().simple(),
            TEMP_EXTENSION
        ));
        let final_path = dir.join(format!("{}.{}", key, ENTRY_EXTENSION));

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            remove_quietly(&temp_path);
            return Err(e.into());
        }

        debug!(category = %category, key = %key, bytes = bytes.len(), "Cache entry stored");
        Ok(())
    }

    /// Removes every entry in `category`, or all entries when `None`.
    pub fn clear(&self, category: Option<&str>) -> CacheResult<usize> {
        let dirs = match category {
            Some(c) => vec![self.category_path(c)?],
            None => self.category_dirs()?,
        };

        let mut removed = 0;
        for dir in dirs {
            for path in entry_files(&dir)? {
                if fs::remove_file(&path).is_ok() {
                    removed += 1;
                }
            }
        }

        debug!(category = ?category, removed, "Cache cleared");
        Ok(removed)
    }

    /// Deletes exactly the expired entries and returns how many went.
    ///
    /// Undecodable files are left for [`get`](Self::get) to purge and still show up in
    /// [`stats`](Self::stats) as corrupted.
    pub fn sweep_expired(&self) -> CacheResult<usize> {
        let now = now_ms();
        let mut removed = 0;

        for dir in self.category_dirs()? {
            for path in entry_files(&dir)? {
                if let Some(Probe::Expired) = self.probe(&path, None, now)
                    && fs::remove_file(&path).is_ok()
                {
                    removed += 1;
                }
            }
        }

        debug!(removed, "Expired cache entries swept");
        Ok(removed)
    }

    /// Counts entries by state without modifying anything.
    pub fn stats(&self) -> CacheResult<CacheStats> {
        let now = now_ms();
        let mut stats = CacheStats::default();

        for dir in self.category_dirs()? {
            for path in entry_files(&dir)? {
                let Some(probe) = self.probe(&path, None, now) else {
                    continue;
                };
                match probe {
                    Probe::Valid(_) => stats.valid += 1,
                    Probe::Expired => stats.expired += 1,
                    Probe::Corrupted => stats.corrupted += 1,
                }
                stats.total += 1;
                stats.size_bytes += fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            }
        }

        Ok(stats)
    }

    fn category_dirs(&self) -> CacheResult<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }

    /// Reads and classifies one entry file. `None` means the file is gone.
    ///
    /// When `expected` is given, the record must also carry that category and key.
    fn probe(&self, path: &Path, expected: Option<(&str, &str)>, now: i64) -> Option<Probe> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read cache entry");
                return Some(Probe::Corrupted);
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(e) => e,
            Err(_) => return Some(Probe::Corrupted),
        };

        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem == entry.key);
        let identity_matches = match expected {
            Some((category, key)) => entry.category == category && entry.key == key,
            None => true,
        };
        if !stem_matches || !identity_matches {
            return Some(Probe::Corrupted);
        }

        if entry.is_expired(now, self.ttl_ms()) {
            Some(Probe::Expired)
        } else {
            Some(Probe::Valid(entry))
        }
    }
}

fn entry_files(dir: &Path) -> CacheResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && let Some(ext) = path.extension()
            && ext == ENTRY_EXTENSION
        {
            files.push(path);
        }
    }
    Ok(files)
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = ?path, error = %e, "Failed to remove cache file");
    }
}

#[inline]
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
