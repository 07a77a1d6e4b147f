// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Motion sensor policy and sensitivity.

use std::fmt;
use std::str::FromStr;

use crate::device::settings;
use crate::error::SettingError;

/// What the doorbell does when it detects motion.
///
/// # Examples
///
/// ```
/// use skybell_lib::types::MotionPolicy;
///
/// assert_eq!(MotionPolicy::from(true), MotionPolicy::Call);
/// assert_eq!(MotionPolicy::Disabled.as_str(), "disabled");
/// assert_eq!("call".parse::<MotionPolicy>().unwrap(), MotionPolicy::Call);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionPolicy {
    /// Motion triggers a call (sensor on).
    Call,
    /// Motion is ignored (sensor off).
    Disabled,
}

impl MotionPolicy {
    /// Returns the API string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Disabled => "disabled",
        }
    }

    /// Returns whether the motion sensor is on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Call)
    }
}

impl fmt::Display for MotionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionPolicy {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(Self::Call),
            "disabled" => Ok(Self::Disabled),
            _ => Err(SettingError::invalid_value(settings::MOTION_POLICY, s)),
        }
    }
}

impl From<bool> for MotionPolicy {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Call } else { Self::Disabled }
    }
}

/// Motion detection sensitivity.
///
/// The API expresses sensitivity as a pixel-change threshold, so a *lower*
/// number means a *more* sensitive sensor.
///
/// # Examples
///
/// ```
/// use skybell_lib::types::MotionThreshold;
///
/// assert_eq!(MotionThreshold::High.value(), 32);
/// assert_eq!(MotionThreshold::try_from(100_u8).unwrap(), MotionThreshold::Low);
/// assert!(MotionThreshold::try_from(75_u8).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionThreshold {
    /// Least sensitive (100).
    Low,
    /// Medium sensitivity (50).
    Medium,
    /// Most sensitive (32).
    High,
}

impl MotionThreshold {
    /// All thresholds, least sensitive first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the numeric value used by the API.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self {
            Self::Low => 100,
            Self::Medium => 50,
            Self::High => 32,
        }
    }
}

impl TryFrom<u8> for MotionThreshold {
    type Error = SettingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|threshold| threshold.value() == value)
            .ok_or_else(|| SettingError::invalid_value(settings::MOTION_THRESHOLD, value))
    }
}
