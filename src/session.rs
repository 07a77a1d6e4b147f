// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated session: credentials, HTTP client, and session cache.
//!
//! Every request goes through [`Session::send_request_with`], which
//! implements the authentication protocol:
//!
//! 1. Without a cached access token, log in first (unless the request *is*
//!    the login request).
//! 2. Send the request with the bearer token and the fixed Skybell headers.
//! 3. On a transport error or a status of 400 and above, log in once more and
//!    resend exactly once.
//! 4. If the resend fails too, return [`RequestError`].

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::{Map, Value, json};

use crate::cache::{Cache, CacheStore, keys};
use crate::config::SkybellConfig;
use crate::error::{AuthenticationError, Error, ParseError, ProtocolError, RequestError, Result};
use crate::protocol::{ApiResponse, HttpClient, endpoints};

/// User agent presented to the Skybell cloud.
pub const SKYBELL_USER_AGENT: &str =
    "SkyBell/3.4.1 (iPhone9,2; iOS 11.0; loc=en_US; lang=en-US) com.skybell.doorbell/1";

const ACCEPTS_HEADER: &str = "accepts";
const APP_ID_HEADER: &str = "x-skybell-app-id";
const CLIENT_ID_HEADER: &str = "x-skybell-client-id";

#[derive(Default)]
struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug)]
struct SessionInner {
    credentials: RwLock<Credentials>,
    http: RwLock<HttpClient>,
    cache: Mutex<Cache>,
    file_lock: Mutex<()>,
    store: CacheStore,
}

/// Handle to an authenticated Skybell session.
///
/// Cloning is cheap; clones share credentials, the HTTP client, and the
/// cache. Devices keep a clone to issue their own requests.
///
/// # Examples
///
/// ```no_run
/// use reqwest::Method;
/// use skybell_lib::{Session, SkybellConfig};
///
/// # async fn example() -> skybell_lib::Result<()> {
/// let session = Session::new(&SkybellConfig::new().with_credentials("user", "pass"))?;
///
/// // Logs in implicitly, then lists devices
/// let response = session.send_request(Method::GET, "devices/", None).await?;
/// println!("{}", response.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Creates a session, loading the persisted cache if one exists.
    ///
    /// A fresh cache gets newly generated identifiers; values from an
    /// existing cache file are merged over them, so stored identifiers are
    /// never regenerated.
    ///
    /// # Errors
    ///
    /// Returns error if the cache file cannot be read or the HTTP client
    /// cannot be created.
    pub fn new(config: &SkybellConfig) -> Result<Self> {
        let store = config.cache_store();
        let mut cache = Cache::generate(config.id_generator());
        if store.load_into(&mut cache)? {
            tracing::debug!(path = ?store.path(), "Using cached session identifiers");
        }

        let http = HttpClient::new(config.base_url(), config.timeout())?;

        Ok(Self {
            inner: Arc::new(SessionInner {
                credentials: RwLock::new(Credentials {
                    username: config.username().map(str::to_string),
                    password: config.password().map(str::to_string),
                }),
                http: RwLock::new(http),
                cache: Mutex::new(cache),
                file_lock: Mutex::new(()),
                store,
            }),
        })
    }

    /// Returns the configured username.
    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.inner.credentials.read().username.clone()
    }

    /// Returns whether an access token is cached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.cache.lock().access_token().is_some()
    }

    /// Returns the cached access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner.cache.lock().access_token().map(str::to_string)
    }

    // ========== Authentication ==========

    /// Logs in, replacing the stored credentials with any that are given.
    ///
    /// The cached access token is cleared before the attempt, so a failed
    /// login leaves the session unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::MissingUsername`] or
    /// [`AuthenticationError::MissingPassword`] without any request if a
    /// credential is missing, and [`AuthenticationError::LoginFailed`] if the
    /// login request fails or its response carries no access token.
    pub async fn login(&self, username: Option<&str>, password: Option<&str>) -> Result<()> {
        let (username, password) = {
            let mut credentials = self.inner.credentials.write();
            if let Some(username) = username {
                credentials.username = Some(username.to_string());
            }
            if let Some(password) = password {
                credentials.password = Some(password.to_string());
            }
            let username = credentials
                .username
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or(AuthenticationError::MissingUsername)?;
            let password = credentials
                .password
                .clone()
                .filter(|p| !p.is_empty())
                .ok_or(AuthenticationError::MissingPassword)?;
            (username, password)
        };

        let body = {
            let mut cache = self.inner.cache.lock();
            cache.update(access_token_update(None));
            json!({
                "username": username,
                "password": password,
                "appId": cache.app_id(),
                "token": cache.token(),
            })
        };

        let response = self
            .dispatch(&Method::POST, endpoints::LOGIN, HeaderMap::new(), Some(&body))
            .await
            .map_err(|e| login_failed(e.into()))?;

        let access_token = response
            .json()
            .map_err(|e| login_failed(e.into()))?
            .get(keys::ACCESS_TOKEN)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| login_failed(ParseError::MissingField(keys::ACCESS_TOKEN.to_string()).into()))?;

        self.update_cache(access_token_update(Some(access_token)))?;

        tracing::info!(username = %username, "Login successful");
        Ok(())
    }

    /// Drops the access token and all connection state.
    ///
    /// No remote logout call is made. Returns `false` without doing anything
    /// if the session was not authenticated.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be persisted or a new HTTP client
    /// cannot be created.
    pub fn logout(&self) -> Result<bool> {
        if !self.is_authenticated() {
            return Ok(false);
        }

        let renewed = self.inner.http.read().renew()?;
        *self.inner.http.write() = renewed;
        self.update_cache(access_token_update(None))?;

        tracing::info!("Logged out");
        Ok(true)
    }

    // ========== Requests ==========

    /// Sends an authenticated request, retrying once after re-login.
    ///
    /// `path` is relative to the API base URL (see
    /// [`endpoints`](crate::protocol::endpoints)).
    ///
    /// # Errors
    ///
    /// See [`send_request_with`](Self::send_request_with).
    pub async fn send_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.send_request_with(method, path, HeaderMap::new(), body, true)
            .await
    }

    /// Sends an authenticated request.
    ///
    /// `headers` are sent along; the bearer token and fixed Skybell headers
    /// take precedence over them. With `retry`, a failed attempt triggers one
    /// login and one resend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if an implicit login fails, and
    /// [`Error::Request`] if the final attempt fails.
    pub async fn send_request_with(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<&Value>,
        retry: bool,
    ) -> Result<ApiResponse> {
        if path != endpoints::LOGIN && !self.is_authenticated() {
            self.login(None, None).await?;
        }

        let mut retry = retry;
        loop {
            match self.dispatch(&method, path, headers.clone(), body).await {
                Ok(response) => return Ok(response),
                Err(source) if !retry => {
                    return Err(RequestError {
                        method: method.to_string(),
                        url: self.inner.http.read().url(path),
                        source,
                    }
                    .into());
                }
                Err(error) => {
                    tracing::warn!(%method, path, error = %error, "Skybell request failed, re-authenticating");
                    retry = false;
                    self.login(None, None).await?;
                }
            }
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        mut headers: HeaderMap,
        body: Option<&Value>,
    ) -> std::result::Result<ApiResponse, ProtocolError> {
        {
            let cache = self.inner.cache.lock();
            if let Some(token) = cache.access_token() {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
            }
            headers.insert(USER_AGENT, HeaderValue::from_static(SKYBELL_USER_AGENT));
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(
                HeaderName::from_static(ACCEPTS_HEADER),
                HeaderValue::from_static("*/*"),
            );
            headers.insert(
                HeaderName::from_static(APP_ID_HEADER),
                header_value(cache.app_id())?,
            );
            headers.insert(
                HeaderName::from_static(CLIENT_ID_HEADER),
                header_value(cache.client_id())?,
            );
        }

        let http = self.inner.http.read().clone();
        let url = http.url(path);
        http.send(method.clone(), &url, headers, body).await
    }

    // ========== Cache ==========

    /// Returns a copy of the cached value under `key`.
    #[must_use]
    pub fn cache(&self, key: &str) -> Option<Value> {
        self.inner.cache.lock().get(key).cloned()
    }

    /// Returns a copy of the whole cache.
    #[must_use]
    pub fn cache_snapshot(&self) -> Cache {
        self.inner.cache.lock().clone()
    }

    /// Recursively merges `update` into the cache and persists it.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be written.
    pub fn update_cache(&self, update: Map<String, Value>) -> Result<()> {
        self.modify_cache(|cache| cache.update(update))
    }

    /// Applies `change` under the cache lock and writes the file after that
    /// lock is released. Writers are serialized by `file_lock`, taken first,
    /// so the file always ends up holding the last change.
    fn modify_cache(&self, change: impl FnOnce(&mut Cache)) -> Result<()> {
        let _file = self.inner.file_lock.lock();
        let contents = {
            let mut cache = self.inner.cache.lock();
            change(&mut cache);
            self.inner.store.encode(&cache)?
        };
        if let Some(contents) = contents {
            self.inner.store.write(&contents)?;
        }
        Ok(())
    }

    /// Returns a copy of one device's sub-cache, or of one key within it.
    #[must_use]
    pub fn dev_cache(&self, device_id: &str, key: Option<&str>) -> Option<Value> {
        let cache = self.inner.cache.lock();
        let device = cache.device(device_id)?;
        match key {
            Some(key) => device.get(key).cloned(),
            None => Some(Value::Object(device.clone())),
        }
    }

    /// Recursively merges `update` into one device's sub-cache and persists
    /// it.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be written.
    pub fn update_dev_cache(&self, device_id: &str, update: Map<String, Value>) -> Result<()> {
        self.update_cache(Cache::device_update(device_id, update))
    }

    /// Replaces one key of a device's sub-cache wholesale and persists it.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be written.
    pub fn replace_dev_cache(&self, device_id: &str, key: &str, value: Value) -> Result<()> {
        self.modify_cache(|cache| cache.replace_device_key(device_id, key, value))
    }
}

fn access_token_update(token: Option<String>) -> Map<String, Value> {
    let mut update = Map::new();
    update.insert(
        keys::ACCESS_TOKEN.to_string(),
        token.map_or(Value::Null, Value::String),
    );
    update
}

fn header_value(value: &str) -> std::result::Result<HeaderValue, ProtocolError> {
    HeaderValue::from_str(value).map_err(|_| ProtocolError::InvalidHeader(value.to_string()))
}

fn login_failed(error: Error) -> Error {
    tracing::warn!(error = %error, "Login failed");
    AuthenticationError::LoginFailed(Box::new(error)).into()
}
