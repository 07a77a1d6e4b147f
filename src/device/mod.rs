// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Skybell doorbell devices.
//!
//! A [`Device`] is a typed view over four resources fetched independently
//! from the cloud: the core record, the info record, the settings record, and
//! the recent activity list. Devices are shared as `Arc<Device>`; refreshing
//! updates the existing value in place, so handles stay valid.
//!
//! ```no_run
//! use skybell_lib::{Skybell, SkybellConfig};
//! use skybell_lib::types::ChimeLevel;
//!
//! # async fn example() -> skybell_lib::Result<()> {
//! let skybell = Skybell::new(SkybellConfig::new().with_credentials("user", "pass"))?;
//!
//! if let Some(device) = skybell.get_device("devid123abc", false).await? {
//!     println!("{}", device.desc());
//!
//!     // Validated locally, then sent to the cloud
//!     device.set_outdoor_chime_level(ChimeLevel::High).await?;
//!
//!     device.refresh().await?;
//! }
//! # Ok(())
//! # }
//! ```

mod activity;
pub mod settings;

pub use activity::{Activity, Avatar, EVENT_BUTTON, EVENT_MOTION, EVENT_ON_DEMAND, EventCache};

use std::fmt;

use parking_lot::RwLock;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::cache::{keys, merge_existing};
use crate::error::{ParseError, Result};
use crate::protocol::endpoints;
use crate::session::Session;
use crate::types::{ChimeLevel, LedColor, LedIntensity, MotionPolicy, MotionThreshold, VideoProfile};

const ID: &str = "id";
const TYPE: &str = "type";
const NAME: &str = "name";
const STATUS: &str = "status";
const STATUS_UP: &str = "up";
const LOCATION: &str = "location";
const LOCATION_LAT: &str = "lat";
const LOCATION_LNG: &str = "lng";
const WIFI_LINK: &str = "wifiLink";
const WIFI_SSID: &str = "essid";
const CHECK_IN: &str = "checkedInAt";
const FIRMWARE_VERSION: &str = "firmwareVersion";
const MAC_ADDRESS: &str = "mac";
const SERIAL_NUMBER: &str = "serialNo";
const HARDWARE_REVISION: &str = "hardwareRevision";

#[derive(Debug, Default)]
struct DeviceData {
    core: Map<String, Value>,
    info: Map<String, Value>,
    settings: Map<String, Value>,
    activities: Vec<Activity>,
}

/// One Skybell doorbell.
///
/// Getters read the locally held JSON and never touch the network. Setters
/// validate first and return a [`SettingError`](crate::error::SettingError)
/// without sending anything if the value is rejected.
pub struct Device {
    device_id: String,
    device_type: String,
    session: Session,
    data: RwLock<DeviceData>,
}

impl Device {
    /// Builds a device from its core record, then fetches its info,
    /// settings, and activities.
    ///
    /// A missing `name` defaults to `"<type> <id>"`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingField`] if the record has no `id`, and
    /// any error from the follow-up requests.
    pub async fn new(mut core: Map<String, Value>, session: Session) -> Result<Self> {
        let device_id = core
            .get(ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingField(ID.to_string()))?;
        let device_type = core
            .get(TYPE)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !core.get(NAME).is_some_and(Value::is_string) {
            core.insert(
                NAME.to_string(),
                Value::String(format!("{device_type} {device_id}")),
            );
        }

        let device = Self {
            device_id,
            device_type,
            session,
            data: RwLock::new(DeviceData {
                core,
                ..DeviceData::default()
            }),
        };

        let info = device.fetch_object(&endpoints::device_info(&device.device_id)).await?;
        let settings = device
            .fetch_object(&endpoints::device_settings(&device.device_id))
            .await?;
        {
            let mut data = device.data.write();
            data.info = info;
            data.settings = settings;
        }
        device.update_activities().await?;

        tracing::debug!(device_id = %device.device_id, "Device created");
        Ok(device)
    }

    /// Re-fetches the core, info, and settings records, merges them in, and
    /// re-fetches activities.
    ///
    /// # Errors
    ///
    /// Returns error if any request fails. State fetched before the failure
    /// is kept.
    pub async fn refresh(&self) -> Result<()> {
        let core = self.fetch_object(&endpoints::device(&self.device_id)).await?;
        tracing::debug!(device_id = %self.device_id, ?core, "Device refresh response");

        let info = self.fetch_object(&endpoints::device_info(&self.device_id)).await?;
        tracing::debug!(device_id = %self.device_id, ?info, "Device info refresh response");

        let settings = self
            .fetch_object(&endpoints::device_settings(&self.device_id))
            .await?;
        tracing::debug!(device_id = %self.device_id, ?settings, "Device settings refresh response");

        self.update(Some(core), Some(info), Some(settings));
        self.update_activities().await
    }

    /// Merges partial records into the held JSON.
    ///
    /// Only keys that already exist are updated; nested objects are merged
    /// the same way. Empty or missing records are skipped.
    pub fn update(
        &self,
        core: Option<Map<String, Value>>,
        info: Option<Map<String, Value>>,
        settings: Option<Map<String, Value>>,
    ) {
        let mut data = self.data.write();
        if let Some(core) = core.filter(|m| !m.is_empty()) {
            merge_existing(&mut data.core, core);
        }
        if let Some(info) = info.filter(|m| !m.is_empty()) {
            merge_existing(&mut data.info, info);
        }
        if let Some(settings) = settings.filter(|m| !m.is_empty()) {
            merge_existing(&mut data.settings, settings);
        }
    }

    async fn fetch(&self, path: &str) -> Result<Value> {
        let response = self.session.send_request(Method::GET, path, None).await?;
        Ok(response.json()?)
    }

    async fn fetch_object(&self, path: &str) -> Result<Map<String, Value>> {
        match self.fetch(path).await? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(ParseError::UnexpectedFormat(format!(
                "expected an object from {path}, got {other}"
            ))
            .into()),
        }
    }

    async fn update_activities(&self) -> Result<()> {
        let raw = self
            .fetch(&endpoints::device_activities(&self.device_id))
            .await?;
        tracing::debug!(device_id = %self.device_id, activities = %raw, "Device activities response");

        let activities: Vec<Activity> = match raw {
            Value::Array(items) => items.iter().filter_map(Activity::from_value).collect(),
            Value::Object(_) => Activity::from_value(&raw).into_iter().collect(),
            _ => Vec::new(),
        };

        self.data.write().activities = activities.clone();
        self.update_events(activities)
    }

    fn update_events(&self, activities: Vec<Activity>) -> Result<()> {
        let mut events = self.events();
        events.record_all(activities);

        self.session
            .replace_dev_cache(&self.device_id, keys::EVENT, events.to_value())
    }

    fn events(&self) -> EventCache {
        EventCache::from_value(
            self.session
                .dev_cache(&self.device_id, Some(keys::EVENT))
                .as_ref(),
        )
    }

    // ========== Activities ==========

    /// Returns up to `limit` activities from the last fetch, optionally
    /// only those of one event type. Fetch order is kept.
    #[must_use]
    pub fn activities(&self, limit: usize, event: Option<&str>) -> Vec<Activity> {
        self.data
            .read()
            .activities
            .iter()
            .filter(|activity| event.is_none_or(|event| activity.event == event))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns the cached latest activity.
    ///
    /// With an event type, returns the newest activity of that type. Without
    /// one, returns the newest activity of any type.
    #[must_use]
    pub fn latest(&self, event: Option<&str>) -> Option<Activity> {
        let events = self.events();
        match event {
            Some(event) => events.get(event).cloned(),
            None => events.latest().cloned(),
        }
    }

    /// Fetches avatar metadata.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not an avatar
    /// record.
    pub async fn avatar(&self) -> Result<Avatar> {
        let response = self
            .session
            .send_request(Method::GET, &endpoints::device_avatar(&self.device_id), None)
            .await?;
        Ok(response.parse()?)
    }

    // ========== Identity and Status ==========

    /// Returns the device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the device type, e.g. `skybell hd`.
    #[must_use]
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> String {
        self.core_str(NAME).unwrap_or_default()
    }

    /// Returns the generic status, `up` or `down`.
    #[must_use]
    pub fn status(&self) -> Option<String> {
        self.core_str(STATUS)
    }

    /// Returns whether the status is `up`.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status().as_deref() == Some(STATUS_UP)
    }

    /// Returns `(latitude, longitude)`, each `0.0` when unknown.
    #[must_use]
    pub fn location(&self) -> (f64, f64) {
        let data = self.data.read();
        let location = data.core.get(LOCATION);
        let coordinate = |key: &str| {
            location
                .and_then(|l| l.get(key))
                .and_then(|v| match v {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                })
                .unwrap_or(0.0)
        };
        (coordinate(LOCATION_LAT), coordinate(LOCATION_LNG))
    }

    /// Returns the media URL of the most recent activity.
    #[must_use]
    pub fn image(&self) -> Option<String> {
        self.latest(None).and_then(|activity| activity.media)
    }

    /// Returns the wifi link quality, e.g. `good`.
    #[must_use]
    pub fn wifi_status(&self) -> Option<String> {
        self.data
            .read()
            .info
            .get(STATUS)
            .and_then(|status| status.get(WIFI_LINK))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Returns the wifi network name.
    #[must_use]
    pub fn wifi_ssid(&self) -> Option<String> {
        self.info_str(WIFI_SSID)
    }

    /// Returns the last check-in timestamp as reported.
    #[must_use]
    pub fn last_check_in(&self) -> Option<String> {
        self.info_str(CHECK_IN)
    }

    #[must_use]
    pub fn firmware_version(&self) -> Option<String> {
        self.info_str(FIRMWARE_VERSION)
    }

    #[must_use]
    pub fn mac_address(&self) -> Option<String> {
        self.info_str(MAC_ADDRESS)
    }

    #[must_use]
    pub fn serial_number(&self) -> Option<String> {
        self.info_str(SERIAL_NUMBER)
    }

    #[must_use]
    pub fn hardware_revision(&self) -> Option<String> {
        self.info_str(HARDWARE_REVISION)
    }

    /// Returns a one-line description.
    ///
    /// `Front Door (id: devid123abc) - skybell hd - status: up - wifi status: good`
    #[must_use]
    pub fn desc(&self) -> String {
        format!(
            "{} (id: {}) - {} - status: {} - wifi status: {}",
            self.name(),
            self.device_id,
            self.device_type,
            self.status().unwrap_or_default(),
            self.wifi_status().unwrap_or_default(),
        )
    }

    /// Returns a copy of the core record.
    #[must_use]
    pub fn core_json(&self) -> Map<String, Value> {
        self.data.read().core.clone()
    }

    /// Returns a copy of the info record.
    #[must_use]
    pub fn info_json(&self) -> Map<String, Value> {
        self.data.read().info.clone()
    }

    /// Returns a copy of the settings record.
    #[must_use]
    pub fn settings_json(&self) -> Map<String, Value> {
        self.data.read().settings.clone()
    }

    fn core_str(&self, key: &str) -> Option<String> {
        str_value(&self.data.read().core, key)
    }

    fn info_str(&self, key: &str) -> Option<String> {
        str_value(&self.data.read().info, key)
    }

    fn setting(&self, key: &str) -> Option<Value> {
        self.data.read().settings.get(key).cloned()
    }

    fn setting_u8(&self, key: &str) -> Option<u8> {
        self.setting(key).as_ref().and_then(settings::to_u8)
    }

    // ========== Settings ==========

    /// Returns whether do-not-disturb is on.
    #[must_use]
    pub fn do_not_disturb(&self) -> bool {
        self.setting(settings::DO_NOT_DISTURB)
            .as_ref()
            .and_then(settings::to_bool)
            .unwrap_or(false)
    }

    /// Turns do-not-disturb on or off.
    ///
    /// Returns whether the device accepted the change.
    ///
    /// # Errors
    ///
    /// Returns error if the local cache cannot be updated.
    pub async fn set_do_not_disturb(&self, enabled: bool) -> Result<bool> {
        self.set_setting(settings::DO_NOT_DISTURB, Value::String(enabled.to_string()))
            .await
    }

    /// Returns the outdoor chime level.
    #[must_use]
    pub fn outdoor_chime_level(&self) -> Option<ChimeLevel> {
        self.setting_u8(settings::OUTDOOR_CHIME)
            .and_then(|level| ChimeLevel::try_from(level).ok())
    }

    /// Sets the outdoor chime level.
    ///
    /// # Errors
    ///
    /// See [`set_settings`](Self::set_settings).
    pub async fn set_outdoor_chime_level(&self, level: ChimeLevel) -> Result<bool> {
        self.set_setting(settings::OUTDOOR_CHIME, level.value().into())
            .await
    }

    /// Returns whether the outdoor chime rings at all.
    #[must_use]
    pub fn outdoor_chime(&self) -> bool {
        self.outdoor_chime_level()
            .is_some_and(|level| level.is_enabled())
    }

    /// Returns whether motion detection triggers a call.
    #[must_use]
    pub fn motion_sensor(&self) -> bool {
        self.setting(settings::MOTION_POLICY)
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|policy| policy.parse::<MotionPolicy>().ok())
            .is_some_and(|policy| policy.is_enabled())
    }

    /// Enables or disables the motion sensor.
    ///
    /// # Errors
    ///
    /// See [`set_settings`](Self::set_settings).
    pub async fn set_motion_sensor(&self, enabled: bool) -> Result<bool> {
        let policy = MotionPolicy::from(enabled);
        self.set_setting(settings::MOTION_POLICY, policy.as_str().into())
            .await
    }

    /// Returns the motion threshold.
    #[must_use]
    pub fn motion_threshold(&self) -> Option<MotionThreshold> {
        self.setting_u8(settings::MOTION_THRESHOLD)
            .and_then(|threshold| MotionThreshold::try_from(threshold).ok())
    }

    /// Sets the motion threshold.
    ///
    /// # Errors
    ///
    /// See [`set_settings`](Self::set_settings).
    pub async fn set_motion_threshold(&self, threshold: MotionThreshold) -> Result<bool> {
        self.set_setting(settings::MOTION_THRESHOLD, threshold.value().into())
            .await
    }

    /// Returns the video profile.
    #[must_use]
    pub fn video_profile(&self) -> Option<VideoProfile> {
        self.setting_u8(settings::VIDEO_PROFILE)
            .and_then(|profile| VideoProfile::try_from(profile).ok())
    }

    /// Sets the video profile.
    ///
    /// # Errors
    ///
    /// See [`set_settings`](Self::set_settings).
    pub async fn set_video_profile(&self, profile: VideoProfile) -> Result<bool> {
        self.set_setting(settings::VIDEO_PROFILE, profile.value().into())
            .await
    }

    /// Returns the LED color.
    #[must_use]
    pub fn led_rgb(&self) -> Option<LedColor> {
        Some(LedColor::new(
            self.setting_u8(settings::LED_R)?,
            self.setting_u8(settings::LED_G)?,
            self.setting_u8(settings::LED_B)?,
        ))
    }

    /// Sets the LED color.
    ///
    /// # Errors
    ///
    /// See [`set_settings`](Self::set_settings).
    pub async fn set_led_rgb(&self, color: LedColor) -> Result<bool> {
        let mut change = Map::new();
        change.insert(settings::LED_R.to_string(), color.red().into());
        change.insert(settings::LED_G.to_string(), color.green().into());
        change.insert(settings::LED_B.to_string(), color.blue().into());
        self.set_settings(change).await
    }

    /// Returns the LED intensity.
    #[must_use]
    pub fn led_intensity(&self) -> Option<LedIntensity> {
        self.setting_u8(settings::LED_INTENSITY)
            .and_then(|intensity| LedIntensity::new(intensity).ok())
    }

    /// Sets the LED intensity.
    ///
    /// # Errors
    ///
    /// See [`set_settings`](Self::set_settings).
    pub async fn set_led_intensity(&self, intensity: LedIntensity) -> Result<bool> {
        self.set_setting(settings::LED_INTENSITY, intensity.value().into())
            .await
    }

    async fn set_setting(&self, key: &str, value: Value) -> Result<bool> {
        let mut change = Map::new();
        change.insert(key.to_string(), value);
        self.set_settings(change).await
    }

    /// Validates and applies a raw settings change.
    ///
    /// Every entry is validated before anything is sent. On success the
    /// changed keys are written into the local settings record and `true` is
    /// returned. If the cloud rejects the change, a warning is logged, local
    /// settings are left untouched, and `false` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SettingError`](crate::error::SettingError) for an unknown
    /// key or invalid value; no request is made in that case.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use serde_json::{Map, json};
    /// # async fn example(device: &skybell_lib::Device) -> skybell_lib::Result<()> {
    /// let mut change = Map::new();
    /// change.insert("chime_level".to_string(), json!(2));
    /// change.insert("led_intensity".to_string(), json!(50));
    ///
    /// if !device.set_settings(change).await? {
    ///     println!("device rejected the change");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set_settings(&self, change: Map<String, Value>) -> Result<bool> {
        settings::validate_all(&change)?;

        let body = Value::Object(change);
        let path = endpoints::device_settings(&self.device_id);
        let result = self
            .session
            .send_request_with(Method::PATCH, &path, HeaderMap::new(), Some(&body), true)
            .await;
        match result {
            Ok(_) => {
                if let Value::Object(change) = body {
                    self.data.write().settings.extend(change);
                }
                Ok(true)
            }
            Err(error) => {
                tracing::warn!(device_id = %self.device_id, settings = %body, error = %error, "Failed to change settings");
                Ok(false)
            }
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("device_id", &self.device_id)
            .field("device_type", &self.device_type)
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

fn str_value(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
