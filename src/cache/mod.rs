// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session cache: stable identifiers, access token, and per-device state.
//!
//! The cache is a nested JSON object. Its well-known top-level keys are
//! listed in [`keys`]; anything else merged in through
//! [`Cache::update`] is kept and persisted as well.
//!
//! ```text
//! {
//!   "app_id": "...",        generated once
//!   "client_id": "...",     generated once
//!   "token": "...",         generated once
//!   "access_token": null,   set by login, cleared by logout
//!   "devices": {
//!     "<device id>": { "event": { "<event type>": <activity> } }
//!   }
//! }
//! ```

mod generator;
mod merge;
mod store;

pub use generator::{IdGenerator, RandomIdGenerator};
pub use merge::{deep_merge, merge_existing};
pub use store::CacheStore;

use serde_json::{Map, Value};

/// Well-known cache keys.
pub mod keys {
    /// Application identifier sent with login and every request.
    pub const APP_ID: &str = "app_id";
    /// Client identifier sent with every request.
    pub const CLIENT_ID: &str = "client_id";
    /// Login token.
    pub const TOKEN: &str = "token";
    /// Bearer token, `null` when logged out.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Per-device sub-caches, keyed by device id.
    pub const DEVICES: &str = "devices";
    /// Event cache inside a device sub-cache.
    pub const EVENT: &str = "event";
}

/// In-memory view of the session cache.
///
/// # Examples
///
/// ```
/// use skybell_lib::cache::{Cache, RandomIdGenerator};
///
/// let cache = Cache::generate(&RandomIdGenerator);
/// assert!(cache.access_token().is_none());
/// assert_eq!(cache.token().len(), 32);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cache {
    data: Map<String, Value>,
}

impl Cache {
    /// Creates a fresh cache with newly generated identifiers.
    #[must_use]
    pub fn generate(generator: &dyn IdGenerator) -> Self {
        let mut data = Map::new();
        data.insert(keys::APP_ID.to_string(), generator.gen_id().into());
        data.insert(keys::CLIENT_ID.to_string(), generator.gen_id().into());
        data.insert(keys::TOKEN.to_string(), generator.gen_token().into());
        data.insert(keys::ACCESS_TOKEN.to_string(), Value::Null);
        data.insert(keys::DEVICES.to_string(), Value::Object(Map::new()));
        Self { data }
    }

    /// Wraps an existing JSON object.
    #[must_use]
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn str_field(&self, key: &str) -> &str {
        self.data.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns the application identifier.
    #[must_use]
    pub fn app_id(&self) -> &str {
        self.str_field(keys::APP_ID)
    }

    /// Returns the client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.str_field(keys::CLIENT_ID)
    }

    /// Returns the login token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.str_field(keys::TOKEN)
    }

    /// Returns the bearer token, or `None` when logged out.
    ///
    /// An empty string counts as logged out.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.data
            .get(keys::ACCESS_TOKEN)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Recursively merges `update` into the cache.
    pub fn update(&mut self, update: Map<String, Value>) {
        deep_merge(&mut self.data, update);
    }

    /// Returns the sub-cache for one device.
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<&Map<String, Value>> {
        self.data
            .get(keys::DEVICES)
            .and_then(|devices| devices.get(device_id))
            .and_then(Value::as_object)
    }

    /// Sets `devices.<device_id>.<key>` to `value`, replacing whatever was
    /// stored there instead of merging into it.
    pub fn replace_device_key(&mut self, device_id: &str, key: &str, value: Value) {
        let devices = self
            .data
            .entry(keys::DEVICES)
            .or_insert_with(|| Value::Object(Map::new()));
        if !devices.is_object() {
            *devices = Value::Object(Map::new());
        }
        let Value::Object(devices) = devices else {
            return;
        };

        let device = devices
            .entry(device_id)
            .or_insert_with(|| Value::Object(Map::new()));
        if !device.is_object() {
            *device = Value::Object(Map::new());
        }
        if let Value::Object(device) = device {
            device.insert(key.to_string(), value);
        }
    }

    /// Builds the update that merges `update` under `devices.<device_id>`.
    #[must_use]
    pub fn device_update(device_id: &str, update: Map<String, Value>) -> Map<String, Value> {
        let mut device = Map::new();
        device.insert(device_id.to_string(), Value::Object(update));
        let mut root = Map::new();
        root.insert(keys::DEVICES.to_string(), Value::Object(device));
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct FixedGenerator;

    impl IdGenerator for FixedGenerator {
        fn gen_id(&self) -> String {
            "fixed-id".to_string()
        }

        fn gen_token(&self) -> String {
            "fixed-token".to_string()
        }
    }

    #[test]
    fn generate_uses_injected_generator() {
        let cache = Cache::generate(&FixedGenerator);
        assert_eq!(cache.app_id(), "fixed-id");
        assert_eq!(cache.client_id(), "fixed-id");
        assert_eq!(cache.token(), "fixed-token");
        assert!(cache.access_token().is_none());
        assert_eq!(cache.get(keys::DEVICES), Some(&json!({})));
    }

    #[test]
    fn empty_access_token_is_logged_out() {
        let mut cache = Cache::generate(&FixedGenerator);
        let mut update = Map::new();
        update.insert(keys::ACCESS_TOKEN.to_string(), json!(""));
        cache.update(update);
        assert!(cache.access_token().is_none());
    }

    #[test]
    fn device_update_is_scoped() {
        let mut cache = Cache::generate(&FixedGenerator);
        let mut events = Map::new();
        events.insert(keys::EVENT.to_string(), json!({ "motion": { "id": 1 } }));
        cache.update(Cache::device_update("dev1", events));

        let device = cache.device("dev1").unwrap();
        assert_eq!(device[keys::EVENT]["motion"]["id"], json!(1));
        assert!(cache.device("dev2").is_none());
        assert_eq!(cache.app_id(), "fixed-id");
    }

    #[test]
    fn replace_device_key_drops_stale_fields() {
        let mut cache = Cache::generate(&FixedGenerator);
        let mut events = Map::new();
        events.insert(
            keys::EVENT.to_string(),
            json!({ "motion": { "id": 1, "media": "old.jpg" } }),
        );
        let mut other = Map::new();
        other.insert("name".to_string(), json!("kept"));
        events.extend(other);
        cache.update(Cache::device_update("dev1", events));

        cache.replace_device_key("dev1", keys::EVENT, json!({ "motion": { "id": 2 } }));

        let device = cache.device("dev1").unwrap();
        assert_eq!(device[keys::EVENT], json!({ "motion": { "id": 2 } }));
        assert_eq!(device["name"], json!("kept"));
    }

    #[test]
    fn replace_device_key_creates_missing_device() {
        let mut cache = Cache::generate(&FixedGenerator);
        cache.replace_device_key("dev9", keys::EVENT, json!({}));
        assert_eq!(cache.device("dev9").unwrap()[keys::EVENT], json!({}));
    }
}
