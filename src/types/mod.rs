// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Skybell device settings.
//!
//! Each type can only hold a value the API accepts, so a typed setter can
//! never send an invalid setting.
//!
//! # Types
//!
//! - [`ChimeLevel`] - Outdoor chime volume (0-3)
//! - [`MotionPolicy`] - Motion sensor on (`call`) or off (`disabled`)
//! - [`MotionThreshold`] - Motion sensitivity (100, 50, 32)
//! - [`VideoProfile`] - Recording resolution (0-3)
//! - [`LedColor`] - Status LED color (0-255 per channel)
//! - [`LedIntensity`] - Status LED brightness (0-100%)

mod chime;
mod led;
mod motion;
mod video;

pub use chime::ChimeLevel;
pub use led::{LedColor, LedIntensity};
pub use motion::{MotionPolicy, MotionThreshold};
pub use video::VideoProfile;
