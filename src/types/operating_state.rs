// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Current heating/cooling activity.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What a climate device is actively doing right now.
///
/// Encoded for the host as `IDLE=0`, `HEATING=1`, `COOLING=2`; unknown
/// integers and unknown remote symbols decode to [`OperatingState::Idle`].
///
/// # Examples
///
/// ```
/// use thermobridge::types::OperatingState;
///
/// assert_eq!(OperatingState::Cooling.as_num(), 2);
/// assert_eq!(OperatingState::from_num(7), OperatingState::Idle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperatingState {
    /// Neither heating nor cooling.
    #[default]
    Idle,
    /// Heating.
    Heating,
    /// Cooling.
    Cooling,
}

impl OperatingState {
    /// All operating states, in encoding order.
    pub const ALL: [Self; 3] = [Self::Idle, Self::Heating, Self::Cooling];

    /// Returns the symbol used by the remote API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Heating => "HEATING",
            Self::Cooling => "COOLING",
        }
    }

    /// Returns the numeric characteristic value.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Heating => 1,
            Self::Cooling => 2,
        }
    }

    /// Decodes a numeric characteristic value, defaulting to
    /// [`OperatingState::Idle`].
    #[must_use]
    pub const fn from_num(num: i64) -> Self {
        match num {
            1 => Self::Heating,
            2 => Self::Cooling,
            _ => Self::Idle,
        }
    }

    /// Decodes a remote symbol, defaulting to [`OperatingState::Idle`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "HEATING" => Self::Heating,
            "COOLING" => Self::Cooling,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OperatingState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperatingState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_round_trip() {
        for n in 0..=2 {
            assert_eq!(i64::from(OperatingState::from_num(n).as_num()), n);
        }
        for state in OperatingState::ALL {
            assert_eq!(OperatingState::from_num(i64::from(state.as_num())), state);
        }
    }

    #[test]
    fn out_of_range_decodes_to_idle() {
        assert_eq!(OperatingState::from_num(3), OperatingState::Idle);
        assert_eq!(OperatingState::from_num(-2), OperatingState::Idle);
    }

    #[test]
    fn deserializes_remote_symbols() {
        let state: OperatingState = serde_json::from_str("\"HEATING\"").unwrap();
        assert_eq!(state, OperatingState::Heating);
        let unknown: OperatingState = serde_json::from_str("\"DEFROSTING\"").unwrap();
        assert_eq!(unknown, OperatingState::Idle);
    }
}
