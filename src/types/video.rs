// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Video recording profile.

use std::fmt;

use crate::device::settings;
use crate::error::SettingError;

/// Resolution and quality of recorded video.
///
/// # Examples
///
/// ```
/// use skybell_lib::types::VideoProfile;
///
/// assert_eq!(VideoProfile::Fhd1080p.value(), 0);
/// assert_eq!(VideoProfile::try_from(3_u8).unwrap(), VideoProfile::Sd480p);
/// assert!(VideoProfile::try_from(4_u8).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoProfile {
    /// 1080p.
    Fhd1080p,
    /// 720p, higher bitrate.
    Hd720pBetter,
    /// 720p, lower bitrate.
    Hd720pGood,
    /// 480p.
    Sd480p,
}

impl VideoProfile {
    /// All profiles, highest quality first.
    pub const ALL: [Self; 4] = [
        Self::Fhd1080p,
        Self::Hd720pBetter,
        Self::Hd720pGood,
        Self::Sd480p,
    ];

    /// Returns the numeric value used by the API.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self {
            Self::Fhd1080p => 0,
            Self::Hd720pBetter => 1,
            Self::Hd720pGood => 2,
            Self::Sd480p => 3,
        }
    }
}

impl TryFrom<u8> for VideoProfile {
    type Error = SettingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.value() == value)
            .ok_or_else(|| SettingError::invalid_value(settings::VIDEO_PROFILE, value))
    }
}

impl fmt::Display for VideoProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fhd1080p => "1080p",
            Self::Hd720pBetter => "720p (better)",
            Self::Hd720pGood => "720p (good)",
            Self::Sd480p => "480p",
        };
        f.write_str(name)
    }
}
