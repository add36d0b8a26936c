// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat adapter.

use std::time::Duration;

use super::{ClimateAccessory, reported_operating_state, reported_reading};
use crate::cache::SingleFlightCache;
use crate::error::{FetchError, WriteError};
use crate::protocol::{HttpClient, path_segment};
use crate::state::{CurrentState, StateSnapshot, TargetState, TargetUpdate};
use crate::types::{Characteristic, CharacteristicValue, Mode, OperatingState, TemperatureRange};

/// A thermostat that reports its own operating state.
///
/// Target state lives at `{base}/target-state/{id}` and observed state at
/// `{base}/current-state/{id}`, where `id` is the device identifier. The
/// setpoint range and humidity exposure come from the declaration.
///
/// A thermostat may also receive state snapshots over a push channel, see
/// [`apply_snapshot`](Self::apply_snapshot).
#[derive(Debug)]
pub struct ThermostatAccessory {
    device_id: String,
    client: HttpClient,
    target_path: String,
    target: SingleFlightCache<TargetState>,
    current: SingleFlightCache<CurrentState>,
    range: TemperatureRange,
    show_humidity: bool,
}

impl ThermostatAccessory {
    /// Creates an adapter for the thermostat with the given identifier.
    #[must_use]
    pub fn new(
        client: HttpClient,
        device_id: impl Into<String>,
        range: TemperatureRange,
        timeout: Duration,
    ) -> Self {
        let device_id = device_id.into();
        let segment = path_segment(&device_id);
        let target_path = format!("target-state/{segment}");
        Self {
            target: SingleFlightCache::new(client.clone(), target_path.clone())
                .with_timeout(timeout),
            current: SingleFlightCache::new(client.clone(), format!("current-state/{segment}"))
                .with_timeout(timeout),
            client,
            target_path,
            device_id,
            range,
            show_humidity: false,
        }
    }

    /// Sets whether humidity is exposed.
    #[must_use]
    pub fn with_humidity(mut self, show_humidity: bool) -> Self {
        self.show_humidity = show_humidity;
        self
    }

    /// Returns the remote device identifier.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Folds a pushed snapshot into the cached state.
    ///
    /// Returns the characteristics refreshed by the snapshot, in a stable
    /// order, for the caller to forward to the host. Fields absent from the
    /// snapshot keep their last known value.
    pub fn apply_snapshot(&self, snapshot: &StateSnapshot) -> Vec<(Characteristic, CharacteristicValue)> {
        if let Some(target) = snapshot.merge_target(self.target.latest()) {
            self.target.remember(target);
        }
        if snapshot.operating_state.is_some()
            || snapshot.current_temperature.is_some()
            || snapshot.current_humidity.is_some()
        {
            self.current
                .remember(snapshot.merge_current(self.current.latest()));
        }

        let mut updates = Vec::new();
        if let Some(mode) = snapshot.mode {
            updates.push((Characteristic::TargetHeatingCoolingState, mode.as_num().into()));
        }
        if let Some(value) = snapshot.target_temperature {
            updates.push((Characteristic::TargetTemperature, value.into()));
        }
        if let Some(state) = snapshot.operating_state {
            updates.push((Characteristic::CurrentHeatingCoolingState, state.as_num().into()));
        }
        if let Some(value) = snapshot.current_temperature {
            updates.push((Characteristic::CurrentTemperature, value.into()));
        }
        if self.show_humidity
            && let Some(value) = snapshot.current_humidity
        {
            updates.push((Characteristic::CurrentRelativeHumidity, value.into()));
        }
        updates
    }

    async fn post(&self, update: TargetUpdate) -> Result<(), WriteError> {
        self.client.post_json(&self.target_path, &update).await
    }
}

impl ClimateAccessory for ThermostatAccessory {
    fn temperature_range(&self) -> TemperatureRange {
        self.range
    }

    fn supports_humidity(&self) -> bool {
        self.show_humidity
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
        Ok(reported_operating_state(&current, &self.device_id))
    }

    async fn current_temperature(&self) -> Result<f64, FetchError> {
        let current = self.current.fetch().await?;
        Ok(reported_reading(
            current.current_temperature,
            "currentTemperature",
            &self.device_id,
        ))
    }

    async fn current_humidity(&self) -> Result<Option<f64>, FetchError> {
        if !self.show_humidity {
            return Ok(None);
        }
        let current = self.current.fetch().await?;
        Ok(Some(reported_reading(
            current.current_humidity,
            "currentHumidity",
            &self.device_id,
        )))
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
            Characteristic::CurrentRelativeHumidity => self
                .current
                .latest()
                .filter(|_| self.show_humidity)
                .and_then(|s| s.current_humidity)
                .map(Into::into),
        }
    }
}
