//! Persisted field maps: cache keys, storage backends, tiered writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::errors::EngineError;
use crate::types::StoredFieldMap;

/// Byte budget of the size-limited tier
pub const COMPACT_BUDGET: usize = 8192;

/// Normalize a page address to its cache key: origin plus path, query and
/// fragment dropped. Anything that does not parse as a host-bearing URL
/// keys on the string as given (local snapshot files).
pub fn cache_key(page: &str) -> String {
    match Url::parse(page) {
        Ok(url) if url.has_host() => {
            format!("{}{}", url.origin().ascii_serialization(), url.path())
        }
        _ => page.to_string(),
    }
}

/// Storage backend for analyzed field maps, keyed by cache key.
/// A put replaces the whole record atomically.
pub trait FieldStore: Send + Sync {
    fn put(&self, key: &str, map: &StoredFieldMap) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<StoredFieldMap>>;
    fn list(&self) -> Result<Vec<String>>;
    fn remove(&self, key: &str) -> Result<bool>;
}

/// In-process store used by tests and by `--no-persist` runs
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, StoredFieldMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldStore for MemoryStore {
    fn put(&self, key: &str, map: &StoredFieldMap) -> Result<()> {
        self.records.insert(key.to_string(), map.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<StoredFieldMap>> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.records.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.records.remove(key).is_some())
    }
}

/// One JSON file per cache key under a directory. Records are staged in a
/// temp file and renamed into place so readers never see a half-written
/// record.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(JsonFileStore { dir })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Flatten a cache key into a portable file name
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl FieldStore for JsonFileStore {
    fn put(&self, key: &str, map: &StoredFieldMap) -> Result<()> {
        let path = self.record_path(key);
        let json = serde_json::to_string_pretty(map)?;

        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)
            .context("Failed to stage cache record")?;
        staged.write_all(json.as_bytes())?;
        staged
            .persist(&path)
            .with_context(|| format!("Failed to replace cache record {}", path.display()))?;

        debug!("Wrote field map for '{}' to {}", key, path.display());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<StoredFieldMap>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache record {}", path.display()))?;
        let map = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt cache record {}", path.display()))?;
        Ok(Some(map))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .ok()
                .and_then(|json| serde_json::from_str::<StoredFieldMap>(&json).ok());
            match parsed {
                Some(map) => keys.push(cache_key(&map.url)),
                None => warn!("Skipping unreadable cache record {}", path.display()),
            }
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove cache record {}", path.display()))?;
        Ok(true)
    }
}

/// Which tier accepted a record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Compact,
    Archive,
}

/// Two-tier persistence: a size-limited compact store backed by an
/// unconstrained archive. A record lives in exactly one tier.
pub struct TieredStore {
    compact: Box<dyn FieldStore>,
    archive: Box<dyn FieldStore>,
    budget: usize,
}

impl TieredStore {
    pub fn new(compact: Box<dyn FieldStore>, archive: Box<dyn FieldStore>, budget: usize) -> Self {
        TieredStore {
            compact,
            archive,
            budget,
        }
    }

    /// File-backed tiers under `cache_dir`
    pub fn open(cache_dir: &Path, budget: usize) -> Result<Self> {
        Ok(TieredStore::new(
            Box::new(JsonFileStore::new(cache_dir.join("compact"))?),
            Box::new(JsonFileStore::new(cache_dir.join("archive"))?),
            budget,
        ))
    }

    /// Memory-backed tiers, nothing touches disk
    pub fn in_memory(budget: usize) -> Self {
        TieredStore::new(
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            budget,
        )
    }

    /// Store the compact record when it fits the budget, the full record in
    /// the archive otherwise. Only both tiers failing is an error.
    pub fn put(
        &self,
        key: &str,
        compact: &StoredFieldMap,
        full: &StoredFieldMap,
    ) -> Result<Tier, EngineError> {
        match self.try_compact(key, compact) {
            Ok(()) => {
                self.evict(&*self.archive, key);
                return Ok(Tier::Compact);
            }
            Err(reason) => debug!("Compact tier rejected '{}': {}", key, reason),
        }

        self.archive
            .put(key, full)
            .map_err(|err| EngineError::PersistenceFailure(err.to_string()))?;
        self.evict(&*self.compact, key);
        Ok(Tier::Archive)
    }

    fn try_compact(&self, key: &str, map: &StoredFieldMap) -> Result<()> {
        let size = serde_json::to_vec(map)?.len();
        if size > self.budget {
            anyhow::bail!("record is {} bytes, budget is {}", size, self.budget);
        }
        self.compact.put(key, map)
    }

    /// Drop a stale copy from the tier that did not take the write
    fn evict(&self, tier: &dyn FieldStore, key: &str) {
        if let Err(err) = tier.remove(key) {
            warn!("Failed to drop stale record for '{}': {}", key, err);
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<StoredFieldMap>> {
        if let Some(map) = self.compact.get(key)? {
            return Ok(Some(map));
        }
        self.archive.get(key)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        let mut keys = self.compact.list()?;
        keys.extend(self.archive.list()?);
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let compact = self.compact.remove(key)?;
        let archive = self.archive.remove(key)?;
        Ok(compact || archive)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
