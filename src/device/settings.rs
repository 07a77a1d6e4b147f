// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device setting keys and validation.
//!
//! Every settings change, typed or raw, passes through [`validate`] before a
//! request is made.

use serde_json::{Map, Value};

use crate::error::SettingError;
use crate::types::{ChimeLevel, MotionPolicy, MotionThreshold, VideoProfile};

/// Do-not-disturb flag, sent as the string `"true"` or `"false"`.
pub const DO_NOT_DISTURB: &str = "do_not_disturb";
/// Outdoor chime level.
pub const OUTDOOR_CHIME: &str = "chime_level";
/// Motion policy (`call` or `disabled`).
pub const MOTION_POLICY: &str = "motion_policy";
/// Motion threshold.
pub const MOTION_THRESHOLD: &str = "motion_threshold";
/// Video profile.
pub const VIDEO_PROFILE: &str = "video_profile";
/// LED red channel.
pub const LED_R: &str = "green_r";
/// LED green channel.
pub const LED_G: &str = "green_g";
/// LED blue channel.
pub const LED_B: &str = "green_b";
/// LED intensity.
pub const LED_INTENSITY: &str = "led_intensity";

/// Every setting key that may be changed.
pub const ALL_SETTINGS: [&str; 9] = [
    DO_NOT_DISTURB,
    OUTDOOR_CHIME,
    MOTION_POLICY,
    MOTION_THRESHOLD,
    VIDEO_PROFILE,
    LED_R,
    LED_G,
    LED_B,
    LED_INTENSITY,
];

/// Accepted do-not-disturb values.
pub const DO_NOT_DISTURB_VALUES: [&str; 2] = ["true", "false"];

/// Checks one setting key and value.
///
/// # Errors
///
/// Returns [`SettingError::InvalidSetting`] for an unknown key and
/// [`SettingError::InvalidSettingValue`] for a value outside the key's
/// allowed set or range.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use skybell_lib::device::settings::validate;
///
/// assert!(validate("chime_level", &json!(3)).is_ok());
/// assert!(validate("chime_level", &json!(4)).is_err());
/// assert!(validate("lol", &json!("kik")).is_err());
/// ```
pub fn validate(setting: &str, value: &Value) -> Result<(), SettingError> {
    let invalid = || SettingError::invalid_value(setting, value);
    let small_int = || value.as_u64().and_then(|v| u8::try_from(v).ok());

    match setting {
        DO_NOT_DISTURB => value
            .as_str()
            .filter(|v| DO_NOT_DISTURB_VALUES.contains(v))
            .map(|_| ())
            .ok_or_else(invalid),
        OUTDOOR_CHIME => small_int()
            .and_then(|v| ChimeLevel::try_from(v).ok())
            .map(|_| ())
            .ok_or_else(invalid),
        MOTION_POLICY => value
            .as_str()
            .and_then(|v| v.parse::<MotionPolicy>().ok())
            .map(|_| ())
            .ok_or_else(invalid),
        MOTION_THRESHOLD => small_int()
            .and_then(|v| MotionThreshold::try_from(v).ok())
            .map(|_| ())
            .ok_or_else(invalid),
        VIDEO_PROFILE => small_int()
            .and_then(|v| VideoProfile::try_from(v).ok())
            .map(|_| ())
            .ok_or_else(invalid),
        LED_R | LED_G | LED_B => small_int().map(|_| ()).ok_or_else(invalid),
        LED_INTENSITY => small_int()
            .filter(|v| *v <= 100)
            .map(|_| ())
            .ok_or_else(invalid),
        _ => Err(SettingError::InvalidSetting(setting.to_string())),
    }
}

/// Checks every entry of a settings change.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn validate_all(settings: &Map<String, Value>) -> Result<(), SettingError> {
    settings
        .iter()
        .try_for_each(|(setting, value)| validate(setting, value))
}

/// Interprets a JSON value as a boolean the way the API writes them:
/// a JSON bool, a number, or one of the usual truthy/falsy strings.
pub(crate) fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
            "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interprets a JSON number or numeric string as a `u8`.
pub(crate) fn to_u8(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
