// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Skybell library.
//!
//! This module provides the error hierarchy for every failure the client can
//! surface: authentication, request dispatch, settings validation, response
//! parsing, and cache persistence.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when talking to
/// the Skybell cloud.
#[derive(Debug, Error)]
pub enum Error {
    /// Login failed or was not possible.
    #[error("authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// A request failed even after re-authenticating.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// A setting or setting value was rejected before any request was sent.
    #[error("setting error: {0}")]
    Setting(#[from] SettingError),

    /// Low-level transport failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A response body could not be interpreted.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The session cache could not be read or written.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Errors raised by the login flow.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// No username was supplied, or it was empty.
    #[error("username must be a non-empty string")]
    MissingUsername,

    /// No password was supplied, or it was empty.
    #[error("password must be a non-empty string")]
    MissingPassword,

    /// The login request itself failed.
    #[error("login failed: {0}")]
    LoginFailed(#[source] Box<Error>),
}

/// A non-login request failed after the single allowed retry.
#[derive(Debug, Error)]
#[error("request failed: {method} {url}: retry failed")]
pub struct RequestError {
    /// HTTP method of the failed request.
    pub method: String,
    /// Full URL of the failed request.
    pub url: String,
    /// The failure observed on the final attempt.
    #[source]
    pub source: ProtocolError,
}

/// Settings validation failures.
///
/// These are always returned before any network call is made, and local
/// state is never modified on this path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingError {
    /// The setting key is not one the device understands.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// The value is not in the allowed set or range for the setting.
    #[error("invalid value for setting {setting}: {value}")]
    InvalidSettingValue {
        /// The setting key.
        setting: String,
        /// The rejected value, rendered as JSON.
        value: String,
    },
}

impl SettingError {
    pub(crate) fn invalid_value(setting: &str, value: impl ToString) -> Self {
        Self::InvalidSettingValue {
            setting: setting.to_string(),
            value: value.to_string(),
        }
    }
}

/// Errors related to HTTP communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("HTTP {status} - {reason}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// A header value could not be encoded.
    #[error("invalid header {0}")]
    InvalidHeader(String),
}

/// Errors related to parsing Skybell responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to the on-disk session cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache file does not contain valid JSON.
    #[error("cache format error: {0}")]
    Format(#[from] serde_json::Error),

    /// The cache file is valid JSON but not an object.
    #[error("cache file is not a JSON object")]
    NotAnObject,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
