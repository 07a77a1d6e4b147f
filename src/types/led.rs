// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status LED color and intensity.

use std::fmt;

use crate::device::settings;
use crate::error::SettingError;

/// RGB color of the doorbell's status LED, 8 bits per channel.
///
/// # Examples
///
/// ```
/// use skybell_lib::types::LedColor;
///
/// let red = LedColor::new(255, 0, 0);
/// assert_eq!(red.to_tuple(), (255, 0, 0));
///
/// // Channels outside 0-255 are rejected
/// assert!(LedColor::try_from((256_i64, 0_i64, 0_i64)).is_err());
/// assert!(LedColor::try_from((255_i64, 0_i64, 0_i64)).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl LedColor {
    /// Creates a new LED color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the components as a tuple.
    #[must_use]
    pub const fn to_tuple(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }
}

impl TryFrom<(i64, i64, i64)> for LedColor {
    type Error = SettingError;

    fn try_from((red, green, blue): (i64, i64, i64)) -> Result<Self, Self::Error> {
        let channel = |key: &str, value: i64| {
            u8::try_from(value).map_err(|_| SettingError::invalid_value(key, value))
        };
        Ok(Self::new(
            channel(settings::LED_R, red)?,
            channel(settings::LED_G, green)?,
            channel(settings::LED_B, blue)?,
        ))
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Brightness of the status LED as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use skybell_lib::types::LedIntensity;
///
/// let intensity = LedIntensity::new(25).unwrap();
/// assert_eq!(intensity.value(), 25);
/// assert!(LedIntensity::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedIntensity(u8);

impl LedIntensity {
    /// LED off.
    pub const MIN: Self = Self(0);

    /// Full brightness.
    pub const MAX: Self = Self(100);

    /// Creates a new intensity value.
    ///
    /// # Errors
    ///
    /// Returns `SettingError::InvalidSettingValue` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, SettingError> {
        if value > Self::MAX.0 {
            return Err(SettingError::invalid_value(settings::LED_INTENSITY, value));
        }
        Ok(Self(value))
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for LedIntensity {
    type Error = SettingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for LedIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_rejects_out_of_range_channels() {
        assert_eq!(
            LedColor::try_from((256_i64, 0_i64, 0_i64)).unwrap_err(),
            SettingError::invalid_value("green_r", 256)
        );
        assert_eq!(
            LedColor::try_from((0_i64, -1_i64, 0_i64)).unwrap_err(),
            SettingError::invalid_value("green_g", -1)
        );
        assert_eq!(
            LedColor::try_from((0_i64, 0_i64, 300_i64)).unwrap_err(),
            SettingError::invalid_value("green_b", 300)
        );
    }

    #[test]
    fn color_accepts_bounds() {
        assert_eq!(
            LedColor::try_from((0_i64, 128_i64, 255_i64)).unwrap(),
            LedColor::new(0, 128, 255)
        );
    }

    #[test]
    fn color_display() {
        assert_eq!(LedColor::new(255, 128, 0).to_string(), "#FF8000");
    }

    #[test]
    fn intensity_range() {
        for v in 0..=100 {
            assert_eq!(LedIntensity::new(v).unwrap().value(), v);
        }
        assert!(LedIntensity::new(101).is_err());
    }
}
