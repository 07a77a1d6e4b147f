// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outdoor chime level.

use std::fmt;

use crate::device::settings;
use crate::error::SettingError;

/// Volume of the doorbell's outdoor chime (0-3).
///
/// # Examples
///
/// ```
/// use skybell_lib::types::ChimeLevel;
///
/// let level = ChimeLevel::try_from(2_u8).unwrap();
/// assert_eq!(level, ChimeLevel::Medium);
/// assert_eq!(level.value(), 2);
///
/// // Levels above 3 are rejected
/// assert!(ChimeLevel::try_from(4_u8).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChimeLevel {
    /// Chime disabled.
    Off,
    /// Quiet.
    Low,
    /// Medium volume.
    Medium,
    /// Loud.
    High,
}

impl ChimeLevel {
    /// All levels, quietest first.
    pub const ALL: [Self; 4] = [Self::Off, Self::Low, Self::Medium, Self::High];

    /// Returns the numeric value used by the API.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Returns whether the chime sounds at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl TryFrom<u8> for ChimeLevel {
    type Error = SettingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|level| level.value() == value)
            .ok_or_else(|| SettingError::invalid_value(settings::OUTDOOR_CHIME, value))
    }
}

impl fmt::Display for ChimeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}
