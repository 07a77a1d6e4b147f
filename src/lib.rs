// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `skybell_lib` - A Rust client for the Skybell HD doorbell cloud.
//!
//! This library provides async APIs to log in to the Skybell cloud, list
//! doorbells, read their status, and change their settings.
//!
//! # Supported Features
//!
//! - **Session handling**: Implicit login, one re-login and retry per failed
//!   request, persisted app/client identifiers
//! - **Devices**: Core, info, and settings records with typed accessors
//! - **Settings**: Do-not-disturb, outdoor chime, motion sensor and
//!   threshold, video profile, LED color and intensity, all validated before
//!   anything is sent
//! - **Activities**: Recent activity list and a per-event cache of the latest
//!   button press, motion, and on-demand event
//!
//! # Quick Start
//!
//! ```no_run
//! use skybell_lib::{Skybell, SkybellConfig};
//! use skybell_lib::types::{ChimeLevel, LedColor};
//!
//! #[tokio::main]
//! async fn main() -> skybell_lib::Result<()> {
//!     let skybell = Skybell::new(
//!         SkybellConfig::new().with_credentials("user@example.com", "hunter2"),
//!     )?;
//!
//!     // The first request logs in
//!     for device in skybell.get_devices(false).await? {
//!         println!("{}", device.desc());
//!
//!         device.set_outdoor_chime_level(ChimeLevel::Low).await?;
//!         device.set_led_rgb(LedColor::new(0, 0, 255)).await?;
//!
//!         if let Some(activity) = device.latest(None) {
//!             println!("last event: {} at {:?}", activity.event, activity.created_at);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Session Cache
//!
//! The app id, client id, login token, and access token are kept in a JSON
//! file (`./skybell_cache.json` by default) so that the cloud sees the same
//! client across runs. Use [`SkybellConfig::without_cache`] to keep them in
//! memory only.
//!
//! ```no_run
//! use skybell_lib::{Skybell, SkybellConfig};
//!
//! # async fn example() -> skybell_lib::Result<()> {
//! let config = SkybellConfig::new()
//!     .with_credentials("user@example.com", "hunter2")
//!     .with_cache_path("/var/lib/skybell/cache.json")
//!     .with_auto_login(true)
//!     .with_get_devices(true);
//! let skybell = Skybell::connect(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
mod client;
mod config;
pub mod device;
pub mod error;
pub mod protocol;
mod session;
pub mod types;

pub use client::Skybell;
pub use config::SkybellConfig;
pub use device::{Activity, Avatar, Device, EventCache};
pub use error::{
    AuthenticationError, CacheError, Error, ParseError, ProtocolError, RequestError, Result,
    SettingError,
};
pub use session::{SKYBELL_USER_AGENT, Session};
pub use types::{ChimeLevel, LedColor, LedIntensity, MotionPolicy, MotionThreshold, VideoProfile};
