// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable storage for the session cache.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::CacheError;

use super::Cache;

/// Reads and writes the session cache as pretty-printed JSON.
///
/// A disabled store never touches the filesystem; the cache then lives only
/// as long as the session.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: Option<PathBuf>,
}

impl CacheStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Creates a store that never persists anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Returns the cache file path, if persistence is enabled.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns whether persistence is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.path.is_none()
    }

    /// Merges the persisted cache, if any, over `cache`.
    ///
    /// Returns `Ok(true)` when a cache file was found and loaded.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the file exists but cannot be read or does not
    /// hold a JSON object.
    pub fn load_into(&self, cache: &mut Cache) -> Result<bool, CacheError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No cache file found");
            return Ok(false);
        }

        let contents = fs::read_to_string(path)?;
        let Value::Object(stored) = serde_json::from_str(&contents)? else {
            return Err(CacheError::NotAnObject);
        };

        cache.update(stored);
        tracing::debug!(path = %path.display(), "Loaded cache");
        Ok(true)
    }

    /// Writes `cache` to disk, creating parent directories as needed.
    ///
    /// Does nothing when persistence is disabled.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the file cannot be written.
    pub fn save(&self, cache: &Cache) -> Result<(), CacheError> {
        match self.encode(cache)? {
            Some(contents) => self.write(&contents),
            None => Ok(()),
        }
    }

    /// Serializes `cache` for [`write`](Self::write), or returns `None` when
    /// persistence is disabled.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be serialized.
    pub fn encode(&self, cache: &Cache) -> Result<Option<String>, CacheError> {
        if self.is_disabled() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string_pretty(cache.as_map())?))
    }

    /// Writes already serialized cache contents to disk, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the file cannot be written.
    pub fn write(&self, contents: &str) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;

        tracing::trace!(path = %path.display(), "Saved cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RandomIdGenerator;

    #[test]
    fn disabled_store_is_inert() {
        let store = CacheStore::disabled();
        let mut cache = Cache::generate(&RandomIdGenerator);
        assert!(store.is_disabled());
        assert!(!store.load_into(&mut cache).unwrap());
        store.save(&cache).unwrap();
    }

    #[test]
    fn save_then_load_round_trips_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested").join("cache.json"));

        let original = Cache::generate(&RandomIdGenerator);
        store.save(&original).unwrap();

        let mut reloaded = Cache::generate(&RandomIdGenerator);
        assert!(store.load_into(&mut reloaded).unwrap());
        assert_eq!(reloaded.app_id(), original.app_id());
        assert_eq!(reloaded.client_id(), original.client_id());
        assert_eq!(reloaded.token(), original.token());
        assert_eq!(reloaded, original);
    }

    #[test]
    fn encode_then_write_matches_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache.json"));
        let cache = Cache::generate(&RandomIdGenerator);

        let contents = store.encode(&cache).unwrap().unwrap();
        assert!(!store.path().unwrap().exists());
        store.write(&contents).unwrap();

        let mut reloaded = Cache::generate(&RandomIdGenerator);
        assert!(store.load_into(&mut reloaded).unwrap());
        assert_eq!(reloaded, cache);
    }

    #[test]
    fn disabled_store_encodes_nothing() {
        let cache = Cache::generate(&RandomIdGenerator);
        assert!(CacheStore::disabled().encode(&cache).unwrap().is_none());
    }

    #[test]
    fn load_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = CacheStore::new(&path);
        let mut cache = Cache::generate(&RandomIdGenerator);
        assert!(matches!(
            store.load_into(&mut cache),
            Err(CacheError::NotAnObject)
        ));
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();

        let store = CacheStore::new(&path);
        let mut cache = Cache::generate(&RandomIdGenerator);
        assert!(matches!(
            store.load_into(&mut cache),
            Err(CacheError::Format(_))
        ));
    }
}
