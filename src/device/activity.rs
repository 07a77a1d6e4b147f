// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device activity records and the per-event "latest activity" cache.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Doorbell button press.
pub const EVENT_BUTTON: &str = "device:sensor:button";
/// Motion detected.
pub const EVENT_MOTION: &str = "device:sensor:motion";
/// Live view requested from the app.
pub const EVENT_ON_DEMAND: &str = "application:on-demand";

/// One activity record as returned by `devices/{id}/activities/`.
///
/// Fields the client does not interpret are kept in [`extra`](Self::extra)
/// and written back unchanged when the record is cached.
///
/// # Examples
///
/// ```
/// use skybell_lib::Activity;
///
/// let json = r#"{
///     "id": "activityId",
///     "event": "device:sensor:motion",
///     "createdAt": "2018-01-01T12:00:00Z",
///     "media": "http://www.image.com/image.jpg"
/// }"#;
/// let activity: Activity = serde_json::from_str(json).unwrap();
///
/// assert_eq!(activity.event, "device:sensor:motion");
/// assert!(activity.created_at.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ActivityRecord")]
pub struct Activity {
    /// Activity identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Event type, e.g. [`EVENT_MOTION`].
    #[serde(default)]
    pub event: String,
    /// Activity state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Recording state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_state: Option<String>,
    /// Creation time; `None` if missing or unparseable. An unparseable
    /// value is kept verbatim in [`extra`](Self::extra).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Full-size media URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// Thumbnail media URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_small: Option<String>,
    /// Id of the device that produced the activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Call identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    /// Parses an activity from a JSON value.
    ///
    /// Returns `None` for anything that is not a JSON object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Returns the activity as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Wire form of [`Activity`] with timestamps left unparsed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    event: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    video_state: Option<String>,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default)]
    updated_at: Option<Value>,
    #[serde(default)]
    media: Option<String>,
    #[serde(default)]
    media_small: Option<String>,
    #[serde(default)]
    device: Option<String>,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<ActivityRecord> for Activity {
    fn from(record: ActivityRecord) -> Self {
        let mut extra = record.extra;
        let created_at = parse_or_keep("createdAt", record.created_at, &mut extra);
        let updated_at = parse_or_keep("updatedAt", record.updated_at, &mut extra);

        Self {
            id: record.id,
            event: record.event,
            state: record.state,
            video_state: record.video_state,
            created_at,
            updated_at,
            media: record.media,
            media_small: record.media_small,
            device: record.device,
            call_id: record.call_id,
            extra,
        }
    }
}

/// Parses an RFC 3339 timestamp, moving the raw value into `extra` under
/// `key` when it does not parse.
fn parse_or_keep(
    key: &str,
    raw: Option<Value>,
    extra: &mut Map<String, Value>,
) -> Option<DateTime<Utc>> {
    let raw = raw.filter(|value| !value.is_null())?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        extra.insert(key.to_string(), raw);
    }
    parsed
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

/// Most recent activity per event type.
///
/// Updates are monotonic: a record only replaces the cached one for its event
/// type if it is at least as new. Refetching stale data never moves an entry
/// back in time.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use skybell_lib::{Activity, EventCache};
///
/// let mut events = EventCache::new();
/// let newer = Activity::from_value(&json!({
///     "event": "device:sensor:motion", "createdAt": "2018-01-02T00:00:00Z"
/// })).unwrap();
/// let older = Activity::from_value(&json!({
///     "event": "device:sensor:motion", "createdAt": "2018-01-01T00:00:00Z"
/// })).unwrap();
///
/// events.record(newer.clone());
/// events.record(older);
/// assert_eq!(events.get("device:sensor:motion"), Some(&newer));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventCache {
    events: BTreeMap<String, Activity>,
}

impl EventCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cache from its persisted JSON form.
    ///
    /// Entries that are not activity objects are dropped.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        let events = value
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(event, activity)| {
                        Activity::from_value(activity).map(|a| (event.clone(), a))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { events }
    }

    /// Records `activity` unless a newer one is already cached for its
    /// event type. Returns whether the cache changed.
    pub fn record(&mut self, activity: Activity) -> bool {
        if let Some(existing) = self.events.get(&activity.event)
            && activity.created_at < existing.created_at
        {
            tracing::trace!(event = %activity.event, "Ignoring older activity");
            return false;
        }
        self.events.insert(activity.event.clone(), activity);
        true
    }

    /// Records every activity in order.
    pub fn record_all(&mut self, activities: impl IntoIterator<Item = Activity>) {
        for activity in activities {
            self.record(activity);
        }
    }

    /// Returns the cached activity for one event type.
    #[must_use]
    pub fn get(&self, event: &str) -> Option<&Activity> {
        self.events.get(event)
    }

    /// Returns the newest cached activity across all event types.
    ///
    /// On equal timestamps the first entry in event-type order wins.
    #[must_use]
    pub fn latest(&self) -> Option<&Activity> {
        self.events.values().fold(None, |latest, activity| match latest {
            Some(current) if activity.created_at <= current.created_at => Some(current),
            _ => Some(activity),
        })
    }

    /// Returns the number of cached event types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the persisted JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.events
                .iter()
                .map(|(event, activity)| (event.clone(), activity.to_value()))
                .collect(),
        )
    }
}

/// Device avatar metadata from `devices/{id}/avatar/`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    /// When the avatar was taken.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Image URL.
    #[serde(default)]
    pub url: Option<String>,
}
