// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heat-pump adapter.

use std::time::Duration;

use super::ClimateAccessory;
use crate::cache::SingleFlightCache;
use crate::error::{FetchError, WriteError};
use crate::protocol::HttpClient;
use crate::state::{
    DEFAULT_THRESHOLD, TargetState, TargetUpdate, TemperatureReading, infer_operating_state,
};
use crate::types::{Characteristic, CharacteristicValue, Mode, OperatingState, TemperatureRange};

/// A heat pump whose running state is inferred from a room sensor.
///
/// The heat pump exposes its target state at `{base}/state` and a separate
/// temperature/humidity sensor at `{base}/temperature-and-humidity`. It does
/// not report whether it is heating or cooling, so the operating state is
/// derived from the setpoint, the measured temperature and the mode with
/// [`infer_operating_state`].
#[derive(Debug)]
pub struct HeatpumpAccessory {
    client: HttpClient,
    target: SingleFlightCache<TargetState>,
    sensor: SingleFlightCache<TemperatureReading>,
    threshold: f64,
}

impl HeatpumpAccessory {
    /// Setpoint bounds accepted by the heat pump.
    pub const TEMPERATURE_RANGE: TemperatureRange = TemperatureRange::new(17.0, 30.0);
    /// Path of the target-state resource.
    pub const TARGET_PATH: &'static str = "state";
    /// Path of the sensor resource.
    pub const SENSOR_PATH: &'static str = "temperature-and-humidity";

    /// Creates an adapter reading through `client`.
    #[must_use]
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self {
            target: SingleFlightCache::new(client.clone(), Self::TARGET_PATH).with_timeout(timeout),
            sensor: SingleFlightCache::new(client.clone(), Self::SENSOR_PATH).with_timeout(timeout),
            client,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Sets the inference dead band.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the inference dead band.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    async fn post(&self, update: TargetUpdate) -> Result<(), WriteError> {
        self.client.post_json(Self::TARGET_PATH, &update).await
    }
}

impl ClimateAccessory for HeatpumpAccessory {
    fn temperature_range(&self) -> TemperatureRange {
        Self::TEMPERATURE_RANGE
    }

    fn supports_humidity(&self) -> bool {
        true
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
        let (target, reading) = tokio::try_join!(self.target.fetch(), self.sensor.fetch())?;
        Ok(infer_operating_state(
            reading.temperature,
            target.target_temperature,
            target.mode,
            self.threshold,
        ))
    }

    async fn current_temperature(&self) -> Result<f64, FetchError> {
        Ok(self.sensor.fetch().await?.temperature)
    }

    async fn current_humidity(&self) -> Result<Option<f64>, FetchError> {
        Ok(Some(self.sensor.fetch().await?.humidity))
    }

    fn cached(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match characteristic {
            Characteristic::TargetHeatingCoolingState => {
                self.target.latest().map(|s| s.mode.as_num().into())
            }
            Characteristic::TargetTemperature => {
                self.target.latest().map(|s| s.target_temperature.into())
            }
            Characteristic::CurrentHeatingCoolingState => {
                let target = self.target.latest()?;
                let reading = self.sensor.latest()?;
                let state = infer_operating_state(
                    reading.temperature,
                    target.target_temperature,
                    target.mode,
                    self.threshold,
                );
                Some(state.as_num().into())
            }
            Characteristic::CurrentTemperature => {
                self.sensor.latest().map(|r| r.temperature.into())
            }
            Characteristic::CurrentRelativeHumidity => {
                self.sensor.latest().map(|r| r.humidity.into())
            }
        }
    }
}
