// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declared device configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::AccessoryUuid;
use crate::types::TemperatureRange;

/// The adapter variant a device is bridged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessoryType {
    /// Heat pump with a separate temperature/humidity sensor.
    Heatpump,
    /// Generic thermostat reporting its own operating state.
    Thermostat,
    /// Refrigerator-style thermostat.
    Thermofridge,
}

impl AccessoryType {
    /// All supported variants.
    pub const ALL: [Self; 3] = [Self::Heatpump, Self::Thermostat, Self::Thermofridge];

    /// Returns the configuration tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Heatpump => "heatpump",
            Self::Thermostat => "thermostat",
            Self::Thermofridge => "thermofridge",
        }
    }

    /// Looks up a variant by its configuration tag (case-insensitive).
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag.trim()))
    }
}

impl fmt::Display for AccessoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device declared in the platform configuration.
///
/// The serial number is the stable identity of the device: it selects the
/// remote resource and derives the [`AccessoryUuid`], so re-declaring the
/// same serial number across restarts maps to the same accessory.
///
/// The accessory type is kept as the raw tag; it is resolved when the
/// device is registered so that an unknown tag only fails that device.
///
/// # Examples
///
/// ```
/// use thermobridge::config::{AccessoryType, Device};
///
/// let device = Device::new("Living Room", AccessoryType::Thermostat, "TS-001")
///     .with_temperature_range(15.0, 28.0)
///     .with_humidity(true);
///
/// assert_eq!(device.accessory_kind().unwrap(), AccessoryType::Thermostat);
/// assert_eq!(device.remote_id(), "TS-001");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Display name.
    pub name: String,
    /// Adapter variant tag (`heatpump`, `thermostat`, `thermofridge`).
    pub accessory_type: String,
    /// Stable identifier.
    pub serial_number: String,
    /// Remote identifier, when it differs from the serial number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Manufacturer shown by the host.
    #[serde(default)]
    pub manufacturer: String,
    /// Model shown by the host.
    #[serde(default)]
    pub model: String,
    /// Lowest accepted setpoint (thermostat only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temperature: Option<f64>,
    /// Highest accepted setpoint (thermostat only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<f64>,
    /// Whether to expose humidity (thermostat only).
    #[serde(default)]
    pub show_humidity: bool,
    /// WebSocket URL delivering state snapshots (thermostat only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_url: Option<String>,
}

impl Device {
    /// Default lowest setpoint for thermostats that declare none.
    pub const DEFAULT_MIN_TEMPERATURE: f64 = 10.0;
    /// Default highest setpoint for thermostats that declare none.
    pub const DEFAULT_MAX_TEMPERATURE: f64 = 38.0;

    /// Creates a device declaration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        accessory_type: AccessoryType,
        serial_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            accessory_type: accessory_type.as_str().to_string(),
            serial_number: serial_number.into(),
            device_id: None,
            manufacturer: String::new(),
            model: String::new(),
            min_temperature: None,
            max_temperature: None,
            show_humidity: false,
            push_url: None,
        }
    }

    /// Sets the remote identifier.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Sets the manufacturer.
    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the accepted setpoint range.
    #[must_use]
    pub fn with_temperature_range(mut self, min: f64, max: f64) -> Self {
        self.min_temperature = Some(min);
        self.max_temperature = Some(max);
        self
    }

    /// Sets whether humidity is exposed.
    #[must_use]
    pub fn with_humidity(mut self, show_humidity: bool) -> Self {
        self.show_humidity = show_humidity;
        self
    }

    /// Sets the push channel URL.
    #[must_use]
    pub fn with_push_url(mut self, url: impl Into<String>) -> Self {
        self.push_url = Some(url.into());
        self
    }

    /// Resolves the accessory-type tag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownAccessoryType`] for an unrecognized tag.
    pub fn accessory_kind(&self) -> Result<AccessoryType, ConfigError> {
        AccessoryType::from_tag(&self.accessory_type).ok_or_else(|| {
            ConfigError::UnknownAccessoryType {
                serial_number: self.serial_number.clone(),
                accessory_type: self.accessory_type.clone(),
            }
        })
    }

    /// Returns the identifier used in remote resource paths.
    #[must_use]
    pub fn remote_id(&self) -> &str {
        self.device_id.as_deref().unwrap_or(&self.serial_number)
    }

    /// Returns the deterministic accessory identity of this device.
    #[must_use]
    pub fn uuid(&self) -> AccessoryUuid {
        AccessoryUuid::from_serial_number(&self.serial_number)
    }

    /// Returns the declared setpoint range, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTemperatureRange`] if the lower bound
    /// exceeds the upper bound.
    pub fn temperature_range(&self) -> Result<TemperatureRange, ConfigError> {
        let min = self.min_temperature.unwrap_or(Self::DEFAULT_MIN_TEMPERATURE);
        let max = self.max_temperature.unwrap_or(Self::DEFAULT_MAX_TEMPERATURE);
        if min > max {
            return Err(ConfigError::InvalidTemperatureRange {
                serial_number: self.serial_number.clone(),
                min,
                max,
            });
        }
        Ok(TemperatureRange::new(min, max))
    }
}
