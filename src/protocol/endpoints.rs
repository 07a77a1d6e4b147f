// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Skybell cloud endpoint paths, relative to the API base URL.

/// Default API base URL.
pub const BASE_URL: &str = "https://cloud.myskybell.com/api/v3/";

/// Login endpoint.
pub const LOGIN: &str = "login/";

/// Device list endpoint.
pub const DEVICES: &str = "devices/";

fn device_path(device_id: &str, suffix: &str) -> String {
    format!("{DEVICES}{}/{suffix}", urlencoding::encode(device_id))
}

/// Single device core record.
#[must_use]
pub fn device(device_id: &str) -> String {
    device_path(device_id, "")
}

/// Device info record.
#[must_use]
pub fn device_info(device_id: &str) -> String {
    device_path(device_id, "info/")
}

/// Device settings record.
#[must_use]
pub fn device_settings(device_id: &str) -> String {
    device_path(device_id, "settings/")
}

/// Device activity list.
#[must_use]
pub fn device_activities(device_id: &str) -> String {
    device_path(device_id, "activities/")
}

/// Device avatar metadata.
#[must_use]
pub fn device_avatar(device_id: &str) -> String {
    device_path(device_id, "avatar/")
}
