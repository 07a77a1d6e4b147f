// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON object merge policies.
//!
//! Two policies are in use:
//!
//! - [`deep_merge`] for the session cache: nested objects are merged key by
//!   key, every other value is overwritten, and new keys are added.
//! - [`merge_existing`] for device JSON blobs: only keys that already exist
//!   locally are overwritten, so partial echoes from the server never add
//!   fields.

use serde_json::{Map, Value};

/// Recursively merges `source` into `target`, adding new keys.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use skybell_lib::cache::deep_merge;
///
/// let mut target = json!({"a": {"x": 1}, "b": 2});
/// let source = json!({"a": {"y": 3}, "c": 4});
/// deep_merge(
///     target.as_object_mut().unwrap(),
///     source.as_object().unwrap().clone(),
/// );
/// assert_eq!(target, json!({"a": {"x": 1, "y": 3}, "b": 2, "c": 4}));
/// ```
pub fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        let Value::Object(incoming) = value else {
            target.insert(key, value);
            continue;
        };
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key, Value::Object(incoming));
    }
}

/// Recursively merges `source` into `target`, only touching keys that are
/// already present in `target`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use skybell_lib::cache::merge_existing;
///
/// let mut target = json!({"name": "Front Door", "status": "up"});
/// let source = json!({"status": "down", "extra": true});
/// merge_existing(
///     target.as_object_mut().unwrap(),
///     source.as_object().unwrap().clone(),
/// );
/// assert_eq!(target, json!({"name": "Front Door", "status": "down"}));
/// ```
pub fn merge_existing(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        let Some(existing) = target.get_mut(&key) else {
            continue;
        };
        match (existing, value) {
            (Value::Object(existing), Value::Object(incoming)) => {
                merge_existing(existing, incoming);
            }
            (existing, value) => *existing = value,
        }
    }
}
