// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the Skybell cloud API.
//!
//! [`HttpClient`] performs a single request attempt and maps error statuses to
//! [`ProtocolError`](crate::error::ProtocolError). Authentication and retry
//! live one level up, in [`Session`](crate::Session).

pub mod endpoints;
mod http;

pub use http::HttpClient;

/// Response from the Skybell API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: String,
}

impl ApiResponse {
    /// Creates a new response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: String) -> Self {
        Self { status, body }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the response as a specific type.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON cannot be parsed into the target type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, crate::error::ParseError> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }

    /// Parses the body as a JSON value, treating an empty body as `null`.
    ///
    /// # Errors
    ///
    /// Returns error if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, crate::error::ParseError> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        self.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_null() {
        let response = ApiResponse::new(200, "  ".to_string());
        assert_eq!(response.json().unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn parse_object() {
        let response = ApiResponse::new(200, r#"{"access_token": "abc"}"#.to_string());
        assert_eq!(response.json().unwrap(), json!({"access_token": "abc"}));
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn parse_invalid() {
        let response = ApiResponse::new(200, "<html>".to_string());
        assert!(response.json().is_err());
    }
}
