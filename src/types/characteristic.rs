// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing characteristic descriptors and values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A thermostat characteristic the host platform can read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    /// Selected mode (writable).
    TargetHeatingCoolingState,
    /// Setpoint in degrees Celsius (writable).
    TargetTemperature,
    /// Live operating state (read-only).
    CurrentHeatingCoolingState,
    /// Measured temperature in degrees Celsius (read-only).
    CurrentTemperature,
    /// Measured relative humidity in percent (read-only, optional).
    CurrentRelativeHumidity,
}

impl Characteristic {
    /// Returns `true` if the host may write this characteristic.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(
            self,
            Self::TargetHeatingCoolingState | Self::TargetTemperature
        )
    }

    /// Returns the characteristic name as the host platform spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TargetHeatingCoolingState => "TargetHeatingCoolingState",
            Self::TargetTemperature => "TargetTemperature",
            Self::CurrentHeatingCoolingState => "CurrentHeatingCoolingState",
            Self::CurrentTemperature => "CurrentTemperature",
            Self::CurrentRelativeHumidity => "CurrentRelativeHumidity",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A characteristic value exchanged with the host.
///
/// Enumerated characteristics (mode, operating state) are integers;
/// temperatures and humidity are floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    /// An enumerated value.
    Int(i64),
    /// A measurement or setpoint.
    Float(f64),
}

impl CharacteristicValue {
    /// Returns the value as an integer, truncating floats.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> i64 {
        match *self {
            Self::Int(v) => v,
            Self::Float(v) => v as i64,
        }
    }

    /// Returns the value as an integer if it is whole.
    ///
    /// Floats with a fractional part, and floats outside the `i64` range,
    /// yield `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_whole(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(v as i64),
            Self::Float(_) => None,
        }
    }

    /// Returns the value as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

impl From<u8> for CharacteristicValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Inclusive setpoint bounds a device accepts.
///
/// The bounds are advertised to the host; values are never clamped locally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    /// Lowest accepted setpoint.
    pub min: f64,
    /// Highest accepted setpoint.
    pub max: f64,
}

impl TemperatureRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Value constraints advertised for a numeric characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacteristicProps {
    /// Minimum value.
    pub min_value: f64,
    /// Maximum value.
    pub max_value: f64,
    /// Step between selectable values.
    pub min_step: f64,
}

impl From<TemperatureRange> for CharacteristicProps {
    fn from(range: TemperatureRange) -> Self {
        Self {
            min_value: range.min,
            max_value: range.max,
            min_step: 1.0,
        }
    }
}

/// Describes one characteristic an accessory exposes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicSpec {
    /// The characteristic.
    pub characteristic: Characteristic,
    /// Whether the host should register a set handler.
    pub writable: bool,
    /// Optional value constraints.
    pub props: Option<CharacteristicProps>,
}

impl CharacteristicSpec {
    /// Creates a spec without value constraints.
    #[must_use]
    pub const fn new(characteristic: Characteristic) -> Self {
        Self {
            characteristic,
            writable: characteristic.is_writable(),
            props: None,
        }
    }

    /// Attaches value constraints.
    #[must_use]
    pub const fn with_props(mut self, props: CharacteristicProps) -> Self {
        self.props = Some(props);
        self
    }
}
