// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration.
//!
//! The platform configuration is a JSON document naming the remote API
//! endpoints and the declared devices:
//!
//! ```json
//! {
//!   "name": "Climate",
//!   "endpoints": { "thermofridgeUrl": "http://fridge.local:8001/api/v1" },
//!   "devices": [
//!     { "name": "Heat Pump", "accessoryType": "heatpump", "serialNumber": "HP-1" }
//!   ]
//! }
//! ```
//!
//! Devices are decoded one by one so that a malformed entry does not hide
//! the others.

mod device;

pub use device::{AccessoryType, Device};

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::DEFAULT_THRESHOLD;

/// Remote API locations and request settings shared by all adapters.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use thermobridge::config::EndpointConfig;
///
/// let endpoints = EndpointConfig::default()
///     .with_thermofridge_url("http://fridge.local:8001/api/v1")
///     .with_request_timeout(Duration::from_secs(3));
///
/// assert_eq!(endpoints.request_timeout(), Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointConfig {
    /// Base URL of the heat-pump API.
    pub heatpump_url: String,
    /// Base URL of the thermostat API.
    pub thermostat_url: String,
    /// Base URL of the thermofridge API.
    pub thermofridge_url: String,
    /// Bound on a single remote request, in milliseconds.
    pub request_timeout_ms: u64,
    /// Dead band used when inferring the heat pump's operating state.
    pub dead_band: f64,
}

impl EndpointConfig {
    /// Default heat-pump API base URL.
    pub const DEFAULT_HEATPUMP_URL: &'static str = "http://localhost:8000/api/v1";
    /// Default thermostat API base URL.
    pub const DEFAULT_THERMOSTAT_URL: &'static str = "http://localhost:8000/api/v1";
    /// Default thermofridge API base URL.
    pub const DEFAULT_THERMOFRIDGE_URL: &'static str = "http://localhost:8001/api/v1";
    /// Default request timeout in milliseconds.
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

    /// Points every variant at the same base URL.
    #[must_use]
    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.with_heatpump_url(url.clone())
            .with_thermostat_url(url.clone())
            .with_thermofridge_url(url)
    }

    /// Sets the heat-pump API base URL.
    #[must_use]
    pub fn with_heatpump_url(mut self, url: impl Into<String>) -> Self {
        self.heatpump_url = url.into();
        self
    }

    /// Sets the thermostat API base URL.
    #[must_use]
    pub fn with_thermostat_url(mut self, url: impl Into<String>) -> Self {
        self.thermostat_url = url.into();
        self
    }

    /// Sets the thermofridge API base URL.
    #[must_use]
    pub fn with_thermofridge_url(mut self, url: impl Into<String>) -> Self {
        self.thermofridge_url = url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the inference dead band.
    #[must_use]
    pub fn with_dead_band(mut self, dead_band: f64) -> Self {
        self.dead_band = dead_band;
        self
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the base URL serving the given variant.
    #[must_use]
    pub fn base_url(&self, kind: AccessoryType) -> &str {
        match kind {
            AccessoryType::Heatpump => &self.heatpump_url,
            AccessoryType::Thermostat => &self.thermostat_url,
            AccessoryType::Thermofridge => &self.thermofridge_url,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            heatpump_url: Self::DEFAULT_HEATPUMP_URL.to_string(),
            thermostat_url: Self::DEFAULT_THERMOSTAT_URL.to_string(),
            thermofridge_url: Self::DEFAULT_THERMOFRIDGE_URL.to_string(),
            request_timeout_ms: Self::DEFAULT_REQUEST_TIMEOUT_MS,
            dead_band: DEFAULT_THRESHOLD,
        }
    }
}

/// The platform configuration document.
///
/// # Examples
///
/// ```
/// use thermobridge::config::PlatformConfig;
///
/// let config = PlatformConfig::from_json_str(r#"{
///     "devices": [
///         { "name": "Fridge", "accessoryType": "thermofridge", "serialNumber": "TF-1" },
///         { "name": 42 }
///     ]
/// }"#).unwrap();
///
/// let devices = config.devices();
/// assert!(devices[0].is_ok());
/// assert!(devices[1].is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Platform display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remote API settings.
    #[serde(default)]
    pub endpoints: EndpointConfig,
    /// Declared devices, decoded lazily by [`devices`](Self::devices).
    #[serde(default)]
    pub devices: Vec<serde_json::Value>,
}

impl PlatformConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid JSON or
    /// does not match the platform schema.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = Self::from_json_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            devices = config.devices.len(),
            "Loaded platform configuration"
        );
        Ok(config)
    }

    /// Sets the remote API settings.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Appends a declared device.
    #[must_use]
    pub fn with_device(mut self, device: &Device) -> Self {
        // A Device always serializes to a JSON object.
        if let Ok(value) = serde_json::to_value(device) {
            self.devices.push(value);
        }
        self
    }

    /// Decodes the declared devices in order.
    ///
    /// Each entry decodes independently; malformed entries yield
    /// [`ConfigError::MalformedDevice`] in their position.
    #[must_use]
    pub fn devices(&self) -> Vec<Result<Device, ConfigError>> {
        self.devices
            .iter()
            .enumerate()
            .map(|(index, value)| {
                Device::deserialize(value).map_err(|e| ConfigError::MalformedDevice {
                    index,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Returns the serial number declared by the entry at `index`, even
    /// when the rest of the entry does not decode.
    #[must_use]
    pub fn serial_number_at(&self, index: usize) -> Option<&str> {
        self.devices.get(index)?.get("serialNumber")?.as_str()
    }
}
