// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target heating/cooling mode.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The mode a climate device has been asked to run in.
///
/// Remote devices exchange modes as upper-case symbols; the host platform
/// encodes them as small integers (`OFF=0`, `HEAT=1`, `COOL=2`, `AUTO=3`).
/// Decoding is total in both directions: anything unrecognized becomes
/// [`Mode::Off`].
///
/// # Examples
///
/// ```
/// use thermobridge::types::Mode;
///
/// assert_eq!(Mode::Auto.as_num(), 3);
/// assert_eq!(Mode::from_num(1), Mode::Heat);
/// assert_eq!(Mode::from_num(42), Mode::Off);
/// assert_eq!(Mode::from_name("COOL"), Mode::Cool);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Heat or cool as needed to reach the setpoint.
    Auto,
    /// Heat only.
    Heat,
    /// Cool only.
    Cool,
    /// Switched off.
    #[default]
    Off,
}

impl Mode {
    /// All modes, in encoding order.
    pub const ALL: [Self; 4] = [Self::Off, Self::Heat, Self::Cool, Self::Auto];

    /// Returns the symbol used by the remote API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Heat => "HEAT",
            Self::Cool => "COOL",
            Self::Off => "OFF",
        }
    }

    /// Returns the numeric characteristic value.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Heat => 1,
            Self::Cool => 2,
            Self::Auto => 3,
        }
    }

    /// Decodes a numeric characteristic value, defaulting to [`Mode::Off`].
    #[must_use]
    pub const fn from_num(num: i64) -> Self {
        match num {
            1 => Self::Heat,
            2 => Self::Cool,
            3 => Self::Auto,
            _ => Self::Off,
        }
    }

    /// Decodes a remote symbol, defaulting to [`Mode::Off`].
    ///
    /// Matching is case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "AUTO" => Self::Auto,
            "HEAT" => Self::Heat,
            "COOL" => Self::Cool,
            _ => Self::Off,
        }
    }

    /// Returns `true` if this mode allows the device to heat.
    #[must_use]
    pub const fn allows_heating(&self) -> bool {
        matches!(self, Self::Auto | Self::Heat)
    }

    /// Returns `true` if this mode allows the device to cool.
    #[must_use]
    pub const fn allows_cooling(&self) -> bool {
        matches!(self, Self::Auto | Self::Cool)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}
