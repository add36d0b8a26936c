// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermofridge adapter.

use std::time::Duration;

use super::{ClimateAccessory, reported_operating_state, reported_reading};
use crate::cache::SingleFlightCache;
use crate::error::{FetchError, WriteError};
use crate::protocol::{HttpClient, path_segment};
use crate::state::{CurrentState, TargetState, TargetUpdate};
use crate::types::{Characteristic, CharacteristicValue, Mode, OperatingState, TemperatureRange};

/// A refrigerator-style thermostat addressed by serial number.
///
/// Uses the same resource layout as the thermostat, keyed by serial number,
/// with a fixed 0–30 °C setpoint range and no humidity.
#[derive(Debug)]
pub struct ThermofridgeAccessory {
    serial_number: String,
    client: HttpClient,
    target_path: String,
    target: SingleFlightCache<TargetState>,
    current: SingleFlightCache<CurrentState>,
}

impl ThermofridgeAccessory {
    /// Setpoint bounds accepted by the thermofridge.
    pub const TEMPERATURE_RANGE: TemperatureRange = TemperatureRange::new(0.0, 30.0);

    /// Creates an adapter for the thermofridge with the given serial number.
    #[must_use]
    pub fn new(client: HttpClient, serial_number: impl Into<String>, timeout: Duration) -> Self {
        let serial_number = serial_number.into();
        let segment = path_segment(&serial_number);
        let target_path = format!("target-state/{segment}");
        Self {
            target: SingleFlightCache::new(client.clone(), target_path.clone())
                .with_timeout(timeout),
            current: SingleFlightCache::new(client.clone(), format!("current-state/{segment}"))
                .with_timeout(timeout),
            client,
            target_path,
            serial_number,
        }
    }

    async fn post(&self, update: TargetUpdate) -> Result<(), WriteError> {
        self.client.post_json(&self.target_path, &update).await
    }
}

impl ClimateAccessory for ThermofridgeAccessory {
    fn temperature_range(&self) -> TemperatureRange {
        Self::TEMPERATURE_RANGE
    }

    fn supports_humidity(&self) -> bool {
        false
    }

    async fn mode(&self) -> Result<Mode, FetchError> {
        Ok(self.target.fetch().await?.mode)
    }

    async fn set_mode(&self, mode: Mode) -> Result<(), WriteError> {
        self.post(TargetUpdate::mode(mode)).await
    }

    async fn target_temperature(&self) -> Result<f64, FetchError> {
        Ok(self.target.fetch().await?.target_temperature)
    }

    async fn set_target_temperature(&self, value: f64) -> Result<(), WriteError> {
        self.post(TargetUpdate::target_temperature(value)).await
    }

    async fn operating_state(&self) -> Result<OperatingState, FetchError> {
        let current = self.current.fetch().await?;
        Ok(reported_operating_state(&current, &self.serial_number))
    }

    async fn current_temperature(&self) -> Result<f64, FetchError> {
        let current = self.current.fetch().await?;
        Ok(reported_reading(
            current.current_temperature,
            "currentTemperature",
            &self.serial_number,
        ))
    }

    async fn current_humidity(&self) -> Result<Option<f64>, FetchError> {
        Ok(None)
    }

    fn cached(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match characteristic {
            Characteristic::TargetHeatingCoolingState => {
                self.target.latest().map(|s| s.mode.as_num().into())
            }
            Characteristic::TargetTemperature => {
                self.target.latest().map(|s| s.target_temperature.into())
            }
            Characteristic::CurrentHeatingCoolingState => self
                .current
                .latest()
                .and_then(|s| s.operating_state)
                .map(|s| s.as_num().into()),
            Characteristic::CurrentTemperature => self
                .current
                .latest()
                .and_then(|s| s.current_temperature)
                .map(Into::into),
            Characteristic::CurrentRelativeHumidity => None,
        }
    }
}
