// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the Skybell cloud.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};

use crate::error::ProtocolError;
use crate::protocol::ApiResponse;

/// HTTP client bound to one API base URL.
///
/// Each call to [`send`](Self::send) is a single attempt. Statuses of 400 and
/// above are reported as [`ProtocolError::Status`].
///
/// Cloning is cheap and clones share the connection pool. Replacing the
/// client with a new one drops all connection and cookie state.
///
/// # Examples
///
/// ```
/// use skybell_lib::protocol::HttpClient;
///
/// let client = HttpClient::new("https://cloud.myskybell.com/api/v3", None).unwrap();
/// assert_eq!(client.url("devices/"), "https://cloud.myskybell.com/api/v3/devices/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Creates a new client for the given base URL.
    ///
    /// A trailing slash is appended to the base URL if missing.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ProtocolError> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// Returns a fresh client with the same base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn renew(&self) -> Result<Self, ProtocolError> {
        Self::new(self.base_url.clone(), self.timeout)
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves an endpoint path against the base URL.
    ///
    /// Absolute `http://` or `https://` URLs are returned unchanged.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on transport failure or a status of 400 or
    /// above.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, ProtocolError> {
        tracing::debug!(%method, url = %url, "Sending HTTP request");

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ProtocolError::Http)?;
        let status = response.status();

        if status.as_u16() >= 400 {
            return Err(ProtocolError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(status = status.as_u16(), body = %body, "Received HTTP response");

        Ok(ApiResponse::new(status.as_u16(), body))
    }
}
