// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device adapters exposed to the host as climate accessories.
//!
//! Every declared device is bridged by a [`DeviceAdapter`], which wraps one
//! of a closed set of variants:
//!
//! - [`HeatpumpAccessory`]: infers its operating state from a room sensor
//! - [`ThermostatAccessory`]: reports its operating state, may push updates
//! - [`ThermofridgeAccessory`]: fixed 0–30 °C range, no humidity
//!
//! The variants implement [`ClimateAccessory`] and return errors. The
//! [`DeviceAdapter`] methods called by the host never do: failed reads are
//! answered from the last known value (or a default) and failed writes are
//! logged.

mod heatpump;
mod thermofridge;
mod thermostat;

pub use heatpump::HeatpumpAccessory;
pub use thermofridge::ThermofridgeAccessory;
pub use thermostat::ThermostatAccessory;

use serde::{Deserialize, Serialize};

use crate::config::{AccessoryType, Device, EndpointConfig};
use crate::error::{Error, FetchError, WriteError};
use crate::protocol::HttpClientBuilder;
use crate::state::{CurrentState, StateSnapshot};
use crate::types::{
    Characteristic, CharacteristicSpec, CharacteristicValue, Mode, OperatingState,
    TemperatureRange,
};

/// Capability interface shared by all adapter variants.
#[allow(async_fn_in_trait)]
pub trait ClimateAccessory {
    /// Returns the accepted setpoint range.
    fn temperature_range(&self) -> TemperatureRange;

    /// Returns `true` if the accessory exposes relative humidity.
    fn supports_humidity(&self) -> bool;

    /// Reads the selected mode.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the remote state cannot be read.
    async fn mode(&self) -> Result<Mode, FetchError>;

    /// Selects a mode.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the update is not accepted.
    async fn set_mode(&self, mode: Mode) -> Result<(), WriteError>;

    /// Reads the setpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the remote state cannot be read.
    async fn target_temperature(&self) -> Result<f64, FetchError>;

    /// Changes the setpoint.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the update is not accepted.
    async fn set_target_temperature(&self, value: f64) -> Result<(), WriteError>;

    /// Reads or derives the running state.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the remote state cannot be read.
    async fn operating_state(&self) -> Result<OperatingState, FetchError>;

    /// Reads the measured temperature.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the remote state cannot be read.
    async fn current_temperature(&self) -> Result<f64, FetchError>;

    /// Reads the measured humidity, or `None` if humidity is not exposed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the remote state cannot be read.
    async fn current_humidity(&self) -> Result<Option<f64>, FetchError>;

    /// Returns the last successfully read value of a characteristic.
    fn cached(&self, characteristic: Characteristic) -> Option<CharacteristicValue>;
}

/// The adapter variant backing a [`DeviceAdapter`].
#[derive(Debug)]
pub enum AdapterVariant {
    /// Heat pump.
    Heatpump(HeatpumpAccessory),
    /// Thermostat.
    Thermostat(ThermostatAccessory),
    /// Thermofridge.
    Thermofridge(ThermofridgeAccessory),
}

impl AdapterVariant {
    /// Returns the accessory type of this variant.
    #[must_use]
    pub const fn kind(&self) -> AccessoryType {
        match self {
            Self::Heatpump(_) => AccessoryType::Heatpump,
            Self::Thermostat(_) => AccessoryType::Thermostat,
            Self::Thermofridge(_) => AccessoryType::Thermofridge,
        }
    }
}

impl ClimateAccessory for AdapterVariant {
    fn temperature_range(&self) -> TemperatureRange {
        match self {
            Self::Heatpump(a) => a.temperature_range(),
            Self::Thermostat(a) => a.temperature_range(),
            Self::Thermofridge(a) => a.temperature_range(),
        }
    }

    fn supports_humidity(&self) -> bool {
        match self {
            Self::Heatpump(a) => a.supports_humidity(),
            Self::Thermostat(a) => a.supports_humidity(),
            Self::Thermofridge(a) => a.supports_humidity(),
        }
    }

    async fn mode(&self) -> Result<Mode, FetchError> {
        match self {
            Self::Heatpump(a) => a.mode().await,
            Self::Thermostat(a) => a.mode().await,
            Self::Thermofridge(a) => a.mode().await,
        }
    }

    async fn set_mode(&self, mode: Mode) -> Result<(), WriteError> {
        match self {
            Self::Heatpump(a) => a.set_mode(mode).await,
            Self::Thermostat(a) => a.set_mode(mode).await,
            Self::Thermofridge(a) => a.set_mode(mode).await,
        }
    }

    async fn target_temperature(&self) -> Result<f64, FetchError> {
        match self {
            Self::Heatpump(a) => a.target_temperature().await,
            Self::Thermostat(a) => a.target_temperature().await,
            Self::Thermofridge(a) => a.target_temperature().await,
        }
    }

    async fn set_target_temperature(&self, value: f64) -> Result<(), WriteError> {
        match self {
            Self::Heatpump(a) => a.set_target_temperature(value).await,
            Self::Thermostat(a) => a.set_target_temperature(value).await,
            Self::Thermofridge(a) => a.set_target_temperature(value).await,
        }
    }

    async fn operating_state(&self) -> Result<OperatingState, FetchError> {
        match self {
            Self::Heatpump(a) => a.operating_state().await,
            Self::Thermostat(a) => a.operating_state().await,
            Self::Thermofridge(a) => a.operating_state().await,
        }
    }

    async fn current_temperature(&self) -> Result<f64, FetchError> {
        match self {
            Self::Heatpump(a) => a.current_temperature().await,
            Self::Thermostat(a) => a.current_temperature().await,
            Self::Thermofridge(a) => a.current_temperature().await,
        }
    }

    async fn current_humidity(&self) -> Result<Option<f64>, FetchError> {
        match self {
            Self::Heatpump(a) => a.current_humidity().await,
            Self::Thermostat(a) => a.current_humidity().await,
            Self::Thermofridge(a) => a.current_humidity().await,
        }
    }

    fn cached(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match self {
            Self::Heatpump(a) => a.cached(characteristic),
            Self::Thermostat(a) => a.cached(characteristic),
            Self::Thermofridge(a) => a.cached(characteristic),
        }
    }
}

/// Identification shown by the host for an accessory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryInformation {
    /// Manufacturer.
    pub manufacturer: String,
    /// Model.
    pub model: String,
    /// Serial number.
    pub serial_number: String,
    /// Firmware revision reported to the host.
    pub firmware_revision: String,
}

/// A declared device bridged to the host.
///
/// # Examples
///
/// ```no_run
/// use thermobridge::accessory::DeviceAdapter;
/// use thermobridge::config::{AccessoryType, Device, EndpointConfig};
///
/// # async fn example() -> thermobridge::Result<()> {
/// let device = Device::new("Heat Pump", AccessoryType::Heatpump, "HP-1");
/// let adapter = DeviceAdapter::from_device(&device, &EndpointConfig::default())?;
///
/// // Never fails: falls back to the last known value or a default.
/// let state = adapter.get_operating_state().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceAdapter {
    name: String,
    information: AccessoryInformation,
    push_url: Option<String>,
    variant: AdapterVariant,
}

impl DeviceAdapter {
    /// Builds the adapter for a declared device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the accessory type is unknown or the
    /// declared range is invalid, and [`Error::Protocol`] if the HTTP client
    /// cannot be created.
    pub fn from_device(device: &Device, endpoints: &EndpointConfig) -> Result<Self, Error> {
        let kind = device.accessory_kind()?;
        let timeout = endpoints.request_timeout();
        let client = HttpClientBuilder::new()
            .base_url(endpoints.base_url(kind))
            .timeout(timeout)
            .build()?;

        let variant = match kind {
            AccessoryType::Heatpump => AdapterVariant::Heatpump(
                HeatpumpAccessory::new(client, timeout).with_threshold(endpoints.dead_band),
            ),
            AccessoryType::Thermostat => AdapterVariant::Thermostat(
                ThermostatAccessory::new(
                    client,
                    device.remote_id(),
                    device.temperature_range()?,
                    timeout,
                )
                .with_humidity(device.show_humidity),
            ),
            AccessoryType::Thermofridge => AdapterVariant::Thermofridge(
                ThermofridgeAccessory::new(client, &device.serial_number, timeout),
            ),
        };

        let push_url = match (&variant, &device.push_url) {
            (AdapterVariant::Thermostat(_), Some(url)) => Some(url.clone()),
            (_, Some(_)) => {
                tracing::warn!(
                    serial_number = %device.serial_number,
                    accessory_type = %kind,
                    "Push channel is only supported by thermostats, ignoring pushUrl"
                );
                None
            }
            (_, None) => None,
        };

        Ok(Self {
            name: device.name.clone(),
            information: AccessoryInformation {
                manufacturer: device.manufacturer.clone(),
                model: device.model.clone(),
                serial_number: device.serial_number.clone(),
                firmware_revision: env!("CARGO_PKG_VERSION").to_string(),
            },
            push_url,
            variant,
        })
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the serial number.
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.information.serial_number
    }

    /// Returns the accessory type.
    #[must_use]
    pub const fn kind(&self) -> AccessoryType {
        self.variant.kind()
    }

    /// Returns the identification shown by the host.
    #[must_use]
    pub fn information(&self) -> &AccessoryInformation {
        &self.information
    }

    /// Returns the wrapped variant.
    #[must_use]
    pub fn variant(&self) -> &AdapterVariant {
        &self.variant
    }

    /// Returns the push channel URL, if this accessory receives pushes.
    #[must_use]
    pub fn push_url(&self) -> Option<&str> {
        self.push_url.as_deref()
    }

    /// Returns the characteristics exposed by this accessory.
    #[must_use]
    pub fn characteristics(&self) -> Vec<CharacteristicSpec> {
        let mut specs = vec![
            CharacteristicSpec::new(Characteristic::TargetHeatingCoolingState),
            CharacteristicSpec::new(Characteristic::TargetTemperature)
                .with_props(self.variant.temperature_range().into()),
            CharacteristicSpec::new(Characteristic::CurrentHeatingCoolingState),
            CharacteristicSpec::new(Characteristic::CurrentTemperature),
        ];
        if self.variant.supports_humidity() {
            specs.push(CharacteristicSpec::new(
                Characteristic::CurrentRelativeHumidity,
            ));
        }
        specs
    }

    /// Reads a characteristic.
    ///
    /// Returns `None` only for a characteristic this accessory does not
    /// expose. A failed read is answered with the last known value, or with
    /// a default when nothing has been read yet.
    pub async fn read(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        let result = match characteristic {
            Characteristic::TargetHeatingCoolingState => {
                self.variant.mode().await.map(|m| m.as_num().into())
            }
            Characteristic::TargetTemperature => {
                self.variant.target_temperature().await.map(Into::into)
            }
            Characteristic::CurrentHeatingCoolingState => {
                self.variant.operating_state().await.map(|s| s.as_num().into())
            }
            Characteristic::CurrentTemperature => {
                self.variant.current_temperature().await.map(Into::into)
            }
            Characteristic::CurrentRelativeHumidity => {
                if !self.variant.supports_humidity() {
                    return None;
                }
                match self.variant.current_humidity().await {
                    Ok(Some(humidity)) => Ok(humidity.into()),
                    Ok(None) => return None,
                    Err(e) => Err(e),
                }
            }
        };

        Some(result.unwrap_or_else(|e| self.recover(characteristic, &e)))
    }

    /// Writes a characteristic.
    ///
    /// Returns `false` if the characteristic is read-only. Remote failures
    /// are logged and not reported.
    pub async fn write(&self, characteristic: Characteristic, value: CharacteristicValue) -> bool {
        match characteristic {
            // A fractional mode number is not a known mode and selects OFF.
            Characteristic::TargetHeatingCoolingState => {
                self.set_mode(value.as_whole().unwrap_or(-1)).await;
            }
            Characteristic::TargetTemperature => self.set_target_temperature(value.as_f64()).await,
            _ => {
                tracing::warn!(
                    serial_number = %self.serial_number(),
                    characteristic = %characteristic,
                    "Ignoring write to read-only characteristic"
                );
                return false;
            }
        }
        true
    }

    /// Returns the selected mode as a host number.
    pub async fn get_mode(&self) -> u8 {
        self.read_enum(Characteristic::TargetHeatingCoolingState)
            .await
    }

    /// Selects a mode from a host number; unknown numbers select OFF.
    pub async fn set_mode(&self, value: i64) {
        let mode = Mode::from_num(value);
        tracing::debug!(serial_number = %self.serial_number(), %mode, "Setting mode");
        if let Err(e) = self.variant.set_mode(mode).await {
            tracing::error!(
                serial_number = %self.serial_number(),
                %mode,
                error = %e,
                "Failed to set mode"
            );
        }
    }

    /// Returns the setpoint.
    pub async fn get_target_temperature(&self) -> f64 {
        self.read_float(Characteristic::TargetTemperature).await
    }

    /// Changes the setpoint.
    pub async fn set_target_temperature(&self, value: f64) {
        let range = self.variant.temperature_range();
        if !range.contains(value) {
            tracing::debug!(
                serial_number = %self.serial_number(),
                value,
                min = range.min,
                max = range.max,
                "Setpoint outside advertised range"
            );
        }
        if let Err(e) = self.variant.set_target_temperature(value).await {
            tracing::error!(
                serial_number = %self.serial_number(),
                value,
                error = %e,
                "Failed to set target temperature"
            );
        }
    }

    /// Returns the running state as a host number.
    pub async fn get_operating_state(&self) -> u8 {
        self.read_enum(Characteristic::CurrentHeatingCoolingState)
            .await
    }

    /// Returns the measured temperature.
    pub async fn get_current_temperature(&self) -> f64 {
        self.read_float(Characteristic::CurrentTemperature).await
    }

    /// Returns the measured humidity, or `None` if humidity is not exposed.
    pub async fn get_current_humidity(&self) -> Option<f64> {
        self.read(Characteristic::CurrentRelativeHumidity)
            .await
            .map(|v| v.as_f64())
    }

    /// Folds a pushed snapshot into the cached state.
    ///
    /// Returns the characteristics to refresh on the host. Only thermostats
    /// receive pushes; other variants ignore the snapshot.
    pub fn apply_snapshot(
        &self,
        snapshot: &StateSnapshot,
    ) -> Vec<(Characteristic, CharacteristicValue)> {
        match &self.variant {
            AdapterVariant::Thermostat(a) => a.apply_snapshot(snapshot),
            _ => {
                tracing::debug!(
                    serial_number = %self.serial_number(),
                    "Ignoring snapshot for accessory without push support"
                );
                Vec::new()
            }
        }
    }

    async fn read_enum(&self, characteristic: Characteristic) -> u8 {
        self.read(characteristic)
            .await
            .map_or(0, |v| u8::try_from(v.as_i64()).unwrap_or(0))
    }

    async fn read_float(&self, characteristic: Characteristic) -> f64 {
        self.read(characteristic).await.map_or(0.0, |v| v.as_f64())
    }

    fn recover(&self, characteristic: Characteristic, error: &FetchError) -> CharacteristicValue {
        if let Some(stale) = self.variant.cached(characteristic) {
            tracing::warn!(
                serial_number = %self.serial_number(),
                characteristic = %characteristic,
                error = %error,
                "Read failed, serving last known value"
            );
            return stale;
        }

        tracing::warn!(
            serial_number = %self.serial_number(),
            characteristic = %characteristic,
            error = %error,
            "Read failed with nothing cached, serving default"
        );
        match characteristic {
            Characteristic::TargetHeatingCoolingState => Mode::default().as_num().into(),
            Characteristic::CurrentHeatingCoolingState => {
                OperatingState::default().as_num().into()
            }
            Characteristic::TargetTemperature
            | Characteristic::CurrentTemperature
            | Characteristic::CurrentRelativeHumidity => CharacteristicValue::Float(0.0),
        }
    }
}

/// Returns the reported running state, or IDLE when the device omits it.
pub(crate) fn reported_operating_state(current: &CurrentState, device: &str) -> OperatingState {
    current.operating_state.unwrap_or_else(|| {
        tracing::warn!(device, "Operating state is undefined, assuming IDLE");
        OperatingState::Idle
    })
}

/// Returns a reported measurement, or zero when the device omits it.
pub(crate) fn reported_reading(value: Option<f64>, field: &'static str, device: &str) -> f64 {
    value.unwrap_or_else(|| {
        tracing::warn!(device, field, "Measurement is missing, reporting 0");
        0.0
    })
}
