//! URL-keyed response cache with a fixed time-to-live.
//!
//! The whole map lives in memory and, when backed by a file, is written out
//! in full after every `put`. The file is one JSON object mapping each URL to
//! `[timestamp, status, headers, body]`, with the timestamp in seconds since
//! the Unix epoch.
//!
//! There is no locking: two processes sharing a cache file race, and the last
//! writer wins.
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::CACHE_TTL;
use crate::http::{Headers, Response};

pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("could not write cache file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("could not serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredEntry", into = "StoredEntry")]
pub struct CacheEntry {
    pub timestamp: f64,
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

impl CacheEntry {
    pub fn to_response(&self) -> Response {
        Response::new(self.status, self.headers.clone(), self.body.clone())
    }
}

/// On-disk shape of an entry: a positional array.
#[derive(Serialize, Deserialize)]
struct StoredEntry(f64, u16, Headers, String);

impl From<StoredEntry> for CacheEntry {
    fn from(StoredEntry(timestamp, status, headers, body): StoredEntry) -> Self {
        Self {
            timestamp,
            status,
            headers,
            body,
        }
    }
}

impl From<CacheEntry> for StoredEntry {
    fn from(e: CacheEntry) -> Self {
        StoredEntry(e.timestamp, e.status, e.headers, e.body)
    }
}

pub struct ResponseCache {
    entries: BTreeMap<String, CacheEntry>,
    path: Option<PathBuf>,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl ResponseCache {
    /// Opens the cache stored at `path`.
    ///
    /// A missing file gives an empty cache. An unreadable or corrupted file is
    /// reported and also gives an empty cache, which the next `put` overwrites.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        log::debug!("cache {} loaded with {} entries", path.display(), entries.len());
        Self {
            entries,
            path: Some(path),
            ttl: CACHE_TTL,
            clock: Box::new(SystemClock),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            entries: BTreeMap::new(),
            path: None,
            ttl: CACHE_TTL,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry for `url` if it is younger than the TTL.
    ///
    /// Stale entries are left in place until overwritten.
    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        let entry = self.entries.get(url)?;
        let age = self.now_secs() - entry.timestamp;
        if age < self.ttl.as_secs_f64() {
            Some(entry)
        } else {
            log::debug!("cache entry for {} is stale ({:.1}s old)", url, age);
            None
        }
    }

    pub fn put(
        &mut self,
        url: &str,
        status: u16,
        headers: Headers,
        body: String,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            timestamp: self.now_secs(),
            status,
            headers,
            body,
        };
        self.entries.insert(url.to_string(), entry);
        self.persist()
    }

    fn now_secs(&self) -> f64 {
        self.clock
            .now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }

    fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = serde_json::to_vec(&self.entries)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CacheError::Io(parent.to_path_buf(), e))?;
            }
        }

        // Write beside the target and rename over it so readers never see half a file.
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data).map_err(|e| CacheError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, path).map_err(|e| CacheError::Io(path.clone(), e))?;
        Ok(())
    }
}

fn load(path: &Path) -> BTreeMap<String, CacheEntry> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            log::warn!("cannot read cache {}: {}; starting empty", path.display(), e);
            return BTreeMap::new();
        }
    };
    serde_json::from_slice(&data).unwrap_or_else(|e| {
        log::warn!("cache {} is corrupted ({}); starting empty", path.display(), e);
        BTreeMap::new()
    })
}
