// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Caching of summaries by document identity.

use std::{
    collections::HashMap,
    fmt,
    fs,
    io,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use displaydoc::Display;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use xayn_summarizer::Summary;

#[derive(Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub enabled: bool,
    /// One json file per summary is stored in this directory.
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from(".summaries"),
        }
    }
}

/// The identity of a document, the sha256 of its text and page estimate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn new(text: &str, pages: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update((pages as u64).to_le_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Display, Error)]
pub enum CacheError {
    /// Failed to access the summary cache: {0}
    Io(#[from] io::Error),
    /// Malformed cached summary: {0}
    Malformed(#[from] serde_json::Error),
}

/// A store of summaries.
pub trait SummaryCache: Send + Sync {
    fn get(&self, key: &DocumentKey) -> Result<Option<Summary>, CacheError>;

    fn put(&self, key: &DocumentKey, summary: &Summary) -> Result<(), CacheError>;
}

impl<C> SummaryCache for Box<C>
where
    C: SummaryCache + ?Sized,
{
    fn get(&self, key: &DocumentKey) -> Result<Option<Summary>, CacheError> {
        (**self).get(key)
    }

    fn put(&self, key: &DocumentKey, summary: &Summary) -> Result<(), CacheError> {
        (**self).put(key, summary)
    }
}

/// The absent cache, which never has a summary.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl SummaryCache for NoCache {
    fn get(&self, _key: &DocumentKey) -> Result<Option<Summary>, CacheError> {
        Ok(None)
    }

    fn put(&self, _key: &DocumentKey, _summary: &Summary) -> Result<(), CacheError> {
        Ok(())
    }
}

/// A cache of json files in a directory.
#[derive(Debug)]
pub struct FileCache {
    directory: PathBuf,
}

impl FileCache {
    /// Opens the cache directory, it is created if it doesn't exist.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;

        Ok(Self { directory })
    }

    fn path(&self, key: &DocumentKey) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

impl SummaryCache for FileCache {
    fn get(&self, key: &DocumentKey) -> Result<Option<Summary>, CacheError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn put(&self, key: &DocumentKey, summary: &Summary) -> Result<(), CacheError> {
        // readers never see a partially written summary
        let path = self.path(key);
        let partial = path.with_extension("json.partial");
        fs::write(&partial, serde_json::to_vec(summary)?)?;
        fs::rename(partial, path)?;

        Ok(())
    }
}

/// An in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    summaries: Mutex<HashMap<DocumentKey, Summary>>,
}

impl MemoryCache {
    pub fn len(&self) -> usize {
        lock(&self.summaries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SummaryCache for MemoryCache {
    fn get(&self, key: &DocumentKey) -> Result<Option<Summary>, CacheError> {
        Ok(lock(&self.summaries).get(key).cloned())
    }

    fn put(&self, key: &DocumentKey, summary: &Summary) -> Result<(), CacheError> {
        lock(&self.summaries).insert(key.clone(), summary.clone());
        Ok(())
    }
}

/// Opens the configured cache.
pub fn open(config: &Config) -> Result<Box<dyn SummaryCache>, CacheError> {
    if config.enabled {
        Ok(Box::new(FileCache::open(&config.directory)?))
    } else {
        Ok(Box::new(NoCache))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Computes at most one summary per document at a time.
///
/// Concurrent requests for the same document wait for the first one and are then served from the
/// cache. Failed computations are not cached.
#[derive(Debug, Default)]
pub struct SingleFlight<C> {
    cache: C,
    in_flight: Mutex<HashMap<DocumentKey, Arc<Mutex<()>>>>,
}

impl<C> SingleFlight<C>
where
    C: SummaryCache,
{
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            in_flight: Mutex::default(),
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Gets the cached summary of the document or computes and caches it.
    pub fn get_or_compute<E>(
        &self,
        key: &DocumentKey,
        compute: impl FnOnce() -> Result<Summary, E>,
    ) -> Result<Summary, E>
    where
        E: From<CacheError>,
    {
        let flight = lock(&self.in_flight).entry(key.clone()).or_default().clone();
        let result = {
            let _guard = lock(&*flight);
            self.get_or_compute_exclusive(key, compute)
        };

        // flights are only cloned and dropped under the lock of the map
        let mut in_flight = lock(&self.in_flight);
        drop(flight);
        if in_flight
            .get(key)
            .map_or(false, |flight| Arc::strong_count(flight) == 1)
        {
            in_flight.remove(key);
        }

        result
    }

    fn get_or_compute_exclusive<E>(
        &self,
        key: &DocumentKey,
        compute: impl FnOnce() -> Result<Summary, E>,
    ) -> Result<Summary, E>
    where
        E: From<CacheError>,
    {
        if let Some(summary) = self.cache.get(key)? {
            debug!(%key, "cached summary");
            return Ok(summary);
        }
        let summary = compute()?;
        self.cache.put(key, &summary)?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    use xayn_summarizer::Strategy;

    use super::*;

    fn summary() -> Summary {
        Summary {
            summary_points: vec!["The only point of the text.".into()],
            keywords: vec!["point".into()],
            strategy: Strategy::Trivial,
        }
    }

    #[test]
    fn test_document_key() {
        let key = DocumentKey::new("text", 1);
        assert_eq!(key.as_str().len(), 64);
        assert_eq!(key, DocumentKey::new("text", 1));
        assert_ne!(key, DocumentKey::new("text", 2));
        assert_ne!(key, DocumentKey::new("other text", 1));
    }

    #[test]
    fn test_file_cache() {
        let directory = tempfile::tempdir().unwrap();
        let cache = FileCache::open(directory.path().join("summaries")).unwrap();
        let key = DocumentKey::new("text", 1);
        assert!(cache.get(&key).unwrap().is_none());
        cache.put(&key, &summary()).unwrap();
        assert_eq!(cache.get(&key).unwrap(), Some(summary()));

        let reopened = FileCache::open(directory.path().join("summaries")).unwrap();
        assert_eq!(reopened.get(&key).unwrap(), Some(summary()));
    }

    #[test]
    fn test_malformed_file() {
        let directory = tempfile::tempdir().unwrap();
        let cache = FileCache::open(directory.path()).unwrap();
        let key = DocumentKey::new("text", 1);
        fs::write(directory.path().join(format!("{key}.json")), "[").unwrap();
        assert!(matches!(cache.get(&key), Err(CacheError::Malformed(_))));
    }

    #[test]
    fn test_no_cache() {
        let key = DocumentKey::new("text", 1);
        NoCache.put(&key, &summary()).unwrap();
        assert!(NoCache.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_cache_hit_skips_computation() {
        let flight = SingleFlight::new(MemoryCache::default());
        let key = DocumentKey::new("text", 1);
        let first = flight
            .get_or_compute(&key, || Ok::<_, CacheError>(summary()))
            .unwrap();
        let second = flight
            .get_or_compute(&key, || -> Result<Summary, CacheError> {
                panic!("summary was cached")
            })
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(flight.cache().len(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let flight = SingleFlight::new(MemoryCache::default());
        let key = DocumentKey::new("text", 1);
        flight
            .get_or_compute(&key, || {
                Err(CacheError::Io(io::Error::new(io::ErrorKind::Other, "failed")))
            })
            .unwrap_err();
        assert!(flight.cache().is_empty());
    }

    #[test]
    fn test_single_flight() {
        let flight = SingleFlight::new(MemoryCache::default());
        let key = DocumentKey::new("text", 1);
        let computations = AtomicUsize::new(0);
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    flight
                        .get_or_compute(&key, || {
                            computations.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, CacheError>(summary())
                        })
                        .unwrap()
                });
            }
        });
        assert_eq!(computations.load(Ordering::SeqCst), 1);
        assert!(lock(&flight.in_flight).is_empty());
    }
}
