// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, IdGenerator, RandomIdGenerator};
use crate::protocol::endpoints;

/// Configuration for a [`Skybell`](crate::Skybell) client.
///
/// # Examples
///
/// ```
/// use skybell_lib::SkybellConfig;
/// use std::time::Duration;
///
/// // Defaults: production API, cache file in the working directory
/// let config = SkybellConfig::new();
///
/// // With all options
/// let config = SkybellConfig::new()
///     .with_credentials("user@example.com", "hunter2")
///     .with_cache_path("/tmp/skybell.json")
///     .with_auto_login(true)
///     .with_get_devices(true)
///     .with_timeout(Duration::from_secs(30));
/// assert!(config.auto_login());
/// ```
#[derive(Clone)]
pub struct SkybellConfig {
    username: Option<String>,
    password: Option<String>,
    base_url: String,
    cache_path: PathBuf,
    disable_cache: bool,
    auto_login: bool,
    get_devices: bool,
    timeout: Option<Duration>,
    id_generator: Arc<dyn IdGenerator>,
}

impl SkybellConfig {
    /// Default cache file location.
    pub const DEFAULT_CACHE_PATH: &'static str = "./skybell_cache.json";

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            username: None,
            password: None,
            base_url: endpoints::BASE_URL.to_string(),
            cache_path: PathBuf::from(Self::DEFAULT_CACHE_PATH),
            disable_cache: false,
            auto_login: false,
            get_devices: false,
            timeout: None,
            id_generator: Arc::new(RandomIdGenerator),
        }
    }

    /// Sets the account credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the cache file location.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    /// Keeps the cache in memory only.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.disable_cache = true;
        self
    }

    /// Logs in while connecting, if credentials are set.
    #[must_use]
    pub fn with_auto_login(mut self, enabled: bool) -> Self {
        self.auto_login = enabled;
        self
    }

    /// Populates the device registry while connecting.
    #[must_use]
    pub fn with_get_devices(mut self, enabled: bool) -> Self {
        self.get_devices = enabled;
        self
    }

    /// Sets a per-request timeout. No timeout is applied by default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the generator used for fresh app/client ids and tokens.
    #[must_use]
    pub fn with_id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }

    /// Returns the username if set.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the password if set.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the cache file location.
    #[must_use]
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Returns whether the cache is kept in memory only.
    #[must_use]
    pub fn cache_disabled(&self) -> bool {
        self.disable_cache
    }

    /// Returns whether connecting logs in.
    #[must_use]
    pub fn auto_login(&self) -> bool {
        self.auto_login
    }

    /// Returns whether connecting populates the device registry.
    #[must_use]
    pub fn get_devices(&self) -> bool {
        self.get_devices
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the identifier generator.
    #[must_use]
    pub fn id_generator(&self) -> &dyn IdGenerator {
        self.id_generator.as_ref()
    }

    /// Builds the cache store described by this configuration.
    #[must_use]
    pub fn cache_store(&self) -> CacheStore {
        if self.disable_cache {
            CacheStore::disabled()
        } else {
            CacheStore::new(&self.cache_path)
        }
    }
}

impl Default for SkybellConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SkybellConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkybellConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("cache_path", &self.cache_path)
            .field("disable_cache", &self.disable_cache)
            .field("auto_login", &self.auto_login)
            .field("get_devices", &self.get_devices)
            .field("timeout", &self.timeout)
            .field("id_generator", &self.id_generator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = SkybellConfig::default();
        assert!(config.username().is_none());
        assert!(config.password().is_none());
        assert_eq!(config.base_url(), "https://cloud.myskybell.com/api/v3/");
        assert_eq!(config.cache_path(), Path::new("./skybell_cache.json"));
        assert!(!config.cache_disabled());
        assert!(!config.auto_login());
        assert!(!config.get_devices());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn without_cache_disables_store() {
        let config = SkybellConfig::new().without_cache();
        assert!(config.cache_store().is_disabled());
    }

    #[test]
    fn cache_store_uses_path() {
        let config = SkybellConfig::new().with_cache_path("/tmp/x.json");
        assert_eq!(
            config.cache_store().path(),
            Some(Path::new("/tmp/x.json"))
        );
    }

    #[test]
    fn debug_redacts_password() {
        let config = SkybellConfig::new().with_credentials("foobar", "deadbeef");
        let debug = format!("{config:?}");
        assert!(debug.contains("foobar"));
        assert!(!debug.contains("deadbeef"));
    }
}
