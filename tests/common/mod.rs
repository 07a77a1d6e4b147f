// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures for the wiremock integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use skybell_lib::SkybellConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "foobar";
pub const PASSWORD: &str = "deadbeef";
pub const ACCESS_TOKEN: &str = "magicalauthtokenhere";
pub const DEVID: &str = "devid123abc";

pub const LOGIN_PATH: &str = "/api/v3/login/";
pub const DEVICES_PATH: &str = "/api/v3/devices/";

pub fn device_path(suffix: &str) -> String {
    format!("/api/v3/devices/{DEVID}/{suffix}")
}

/// Configuration pointing at the mock server, without a cache file.
pub fn config(server: &MockServer) -> SkybellConfig {
    SkybellConfig::new()
        .with_credentials(USERNAME, PASSWORD)
        .with_base_url(format!("{}/api/v3/", server.uri()))
        .without_cache()
}

pub fn login_response() -> Value {
    json!({
        "firstName": "John",
        "lastName": "Doe",
        "resourceId": "resourceid123",
        "createdAt": "2016-11-26T22:30:45.254Z",
        "updatedAt": "2016-11-26T22:30:45.254Z",
        "id": "userid123",
        "userLinks": [],
        "access_token": ACCESS_TOKEN
    })
}

pub fn device_response(name: &str) -> Value {
    json!({
        "user": "userid123",
        "uuid": "devuuid123",
        "resourceId": "devresourceid123",
        "deviceInviteToken": "devInviteToken123",
        "location": { "lat": "-0.0", "lng": "0.0" },
        "name": name,
        "type": "skybell hd",
        "status": "up",
        "createdAt": "2016-12-03T16:48:13.651Z",
        "updatedAt": "2017-09-25T23:32:45.374Z",
        "avatar": {
            "bucket": "v3-production-devices-avatar",
            "key": "path/key123.jpg",
            "createdAt": "2017-09-25T23:32:45.312Z",
            "url": "http://www.google.com/"
        },
        "id": DEVID,
        "acl": "owner"
    })
}

pub fn info_response(wifi_status: &str) -> Value {
    json!({
        "wifiNoise": "-79",
        "mac": "dd:cc:99:00:77:88",
        "serialNo": "333444555666",
        "hardwareRevision": "SKYBELL_HD_3_1_1008848-009",
        "firmwareVersion": "1128",
        "essid": "wifi123",
        "deviceId": DEVID,
        "checkedInAt": "2017-09-26T21:03:33.000Z",
        "status": { "wifiLink": wifi_status }
    })
}

pub fn settings_response() -> Value {
    json!({
        "ring_tone": 0,
        "do_not_ring": false,
        "do_not_disturb": false,
        "video_profile": 1,
        "mic_volume": 63,
        "chime_level": 3,
        "motion_threshold": 32,
        "green_r": 255,
        "green_g": 255,
        "green_b": 255,
        "led_intensity": 100,
        "motion_policy": "call"
    })
}

pub fn activity(event: &str, created_at: &str) -> Value {
    json!({
        "_id": format!("activity-{created_at}"),
        "updatedAt": created_at,
        "createdAt": created_at,
        "device": DEVID,
        "callId": created_at,
        "event": event,
        "state": "ready",
        "ttlStartDate": created_at,
        "videoState": "download:ready",
        "id": format!("activity-{created_at}"),
        "media": format!("http://www.image.com/{created_at}.jpg"),
        "mediaSmall": format!("http://www.image.com/{created_at}-small.jpg")
    })
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
        .mount(server)
        .await;
}

/// Mounts the device list and every per-device resource.
pub async fn mount_device(server: &MockServer, activities: Value) {
    Mock::given(method("GET"))
        .and(path(DEVICES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_response("Front Door")])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(device_path("")))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_response("Front Door")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(device_path("info/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(info_response("good")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(device_path("settings/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_response()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(device_path("activities/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(activities))
        .mount(server)
        .await;
}
