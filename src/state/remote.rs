// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payloads exchanged with remote climate devices.

use serde::{Deserialize, Serialize};

use crate::types::{Mode, OperatingState};

/// The desired state of a device, read from and written to its target
/// resource.
///
/// # Examples
///
/// ```
/// use thermobridge::state::TargetState;
/// use thermobridge::types::Mode;
///
/// let json = r#"{"mode":"HEAT","targetTemperature":21.5}"#;
/// let state: TargetState = serde_json::from_str(json).unwrap();
/// assert_eq!(state.mode, Mode::Heat);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetState {
    /// Selected mode.
    pub mode: Mode,
    /// Setpoint in degrees Celsius.
    pub target_temperature: f64,
}

/// A partial update of a device's target resource.
///
/// Fields left as `None` are omitted from the request body so the remote
/// keeps its current value for them.
///
/// # Examples
///
/// ```
/// use thermobridge::state::TargetUpdate;
/// use thermobridge::types::Mode;
///
/// let body = serde_json::to_string(&TargetUpdate::mode(Mode::Cool)).unwrap();
/// assert_eq!(body, r#"{"mode":"COOL"}"#);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetUpdate {
    /// New mode, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// New setpoint, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
}

impl TargetUpdate {
    /// An update that only changes the mode.
    #[must_use]
    pub const fn mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            target_temperature: None,
        }
    }

    /// An update that only changes the setpoint.
    #[must_use]
    pub const fn target_temperature(value: f64) -> Self {
        Self {
            mode: None,
            target_temperature: Some(value),
        }
    }

    /// Returns `true` if the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mode.is_none() && self.target_temperature.is_none()
    }
}

/// Observed state reported by thermostats and thermofridges.
///
/// Every field is optional on the wire; adapters substitute defaults and log
/// a warning when one they need is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentState {
    /// Explicit running state.
    #[serde(default)]
    pub operating_state: Option<OperatingState>,
    /// Measured temperature in degrees Celsius.
    #[serde(default)]
    pub current_temperature: Option<f64>,
    /// Measured relative humidity in percent.
    #[serde(default)]
    pub current_humidity: Option<f64>,
}

/// Sensor reading reported by the heat pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Measured temperature in degrees Celsius.
    pub temperature: f64,
    /// Measured relative humidity in percent.
    pub humidity: f64,
}

/// An unsolicited state snapshot delivered over a push channel.
///
/// Snapshots may be partial; each present field refreshes the matching
/// characteristic.
///
/// # Examples
///
/// ```
/// use thermobridge::state::StateSnapshot;
///
/// let json = r#"{"mode":"AUTO","currentTemperature":22.0}"#;
/// let snapshot: StateSnapshot = serde_json::from_str(json).unwrap();
/// assert!(snapshot.target_temperature.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Selected mode.
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Setpoint in degrees Celsius.
    #[serde(default)]
    pub target_temperature: Option<f64>,
    /// Explicit running state.
    #[serde(default)]
    pub operating_state: Option<OperatingState>,
    /// Measured temperature in degrees Celsius.
    #[serde(default)]
    pub current_temperature: Option<f64>,
    /// Measured relative humidity in percent.
    #[serde(default)]
    pub current_humidity: Option<f64>,
}

impl StateSnapshot {
    /// Merges the target fields of this snapshot over `previous`.
    ///
    /// Returns `None` when neither side provides both a mode and a setpoint.
    #[must_use]
    pub fn merge_target(&self, previous: Option<TargetState>) -> Option<TargetState> {
        let mode = self.mode.or(previous.map(|p| p.mode))?;
        let target_temperature = self
            .target_temperature
            .or(previous.map(|p| p.target_temperature))?;
        Some(TargetState {
            mode,
            target_temperature,
        })
    }

    /// Merges the observed fields of this snapshot over `previous`.
    #[must_use]
    pub fn merge_current(&self, previous: Option<CurrentState>) -> CurrentState {
        let previous = previous.unwrap_or_default();
        CurrentState {
            operating_state: self.operating_state.or(previous.operating_state),
            current_temperature: self.current_temperature.or(previous.current_temperature),
            current_humidity: self.current_humidity.or(previous.current_humidity),
        }
    }

    /// Returns `true` if the snapshot carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.target_temperature.is_none()
            && self.operating_state.is_none()
            && self.current_temperature.is_none()
            && self.current_humidity.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_omits_absent_fields() {
        let body = serde_json::to_string(&TargetUpdate::target_temperature(19.0)).unwrap();
        assert_eq!(body, r#"{"targetTemperature":19.0}"#);
        assert!(TargetUpdate::default().is_empty());
    }

    #[test]
    fn current_state_tolerates_missing_fields() {
        let state: CurrentState = serde_json::from_str(r#"{"currentTemperature":18.5}"#).unwrap();
        assert_eq!(state.operating_state, None);
        assert_eq!(state.current_temperature, Some(18.5));
        assert_eq!(state.current_humidity, None);
    }

    #[test]
    fn current_state_decodes_operating_state() {
        let state: CurrentState =
            serde_json::from_str(r#"{"operatingState":"COOLING","currentTemperature":4.0}"#)
                .unwrap();
        assert_eq!(state.operating_state, Some(OperatingState::Cooling));
    }

    #[test]
    fn temperature_reading_requires_both_fields() {
        assert!(serde_json::from_str::<TemperatureReading>(r#"{"temperature":20.0}"#).is_err());
    }

    #[test]
    fn merge_target_fills_from_previous() {
        let previous = TargetState {
            mode: Mode::Heat,
            target_temperature: 20.0,
        };
        let snapshot = StateSnapshot {
            target_temperature: Some(22.0),
            ..StateSnapshot::default()
        };
        let merged = snapshot.merge_target(Some(previous)).unwrap();
        assert_eq!(merged.mode, Mode::Heat);
        assert!((merged.target_temperature - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn merge_target_without_previous_needs_both_fields() {
        let snapshot = StateSnapshot {
            mode: Some(Mode::Cool),
            ..StateSnapshot::default()
        };
        assert!(snapshot.merge_target(None).is_none());
    }

    #[test]
    fn merge_current_keeps_previous_values() {
        let previous = CurrentState {
            operating_state: Some(OperatingState::Heating),
            current_temperature: Some(19.0),
            current_humidity: Some(40.0),
        };
        let snapshot = StateSnapshot {
            current_humidity: Some(45.0),
            ..StateSnapshot::default()
        };
        let merged = snapshot.merge_current(Some(previous));
        assert_eq!(merged.operating_state, Some(OperatingState::Heating));
        assert_eq!(merged.current_humidity, Some(45.0));
    }
}
