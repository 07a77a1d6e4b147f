// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier and token generation for a fresh session cache.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Source of the stable identifiers stored in a new session cache.
///
/// The session asks for these exactly once, when no cache file exists.
/// Tests can inject a deterministic implementation.
pub trait IdGenerator: fmt::Debug + Send + Sync {
    /// Generates an app or client identifier.
    fn gen_id(&self) -> String;

    /// Generates the login token.
    fn gen_token(&self) -> String;
}

/// Default generator: UUID v4 identifiers and a 32-character alphanumeric
/// token.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    /// Length of generated tokens.
    pub const TOKEN_LEN: usize = 32;
}

impl IdGenerator for RandomIdGenerator {
    fn gen_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn gen_token(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::TOKEN_LEN)
            .map(char::from)
            .collect()
    }
}
