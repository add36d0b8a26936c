// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermobridge - expose networked climate devices as smart-home thermostats.
//!
//! This library bridges heat pumps, thermostats and thermofridges reachable
//! over a JSON/HTTP API to a home-automation host, presenting each one as a
//! thermostat accessory.
//!
//! # Features
//!
//! - **Read coalescing**: concurrent reads of one remote resource share a
//!   single request ([`cache::SingleFlightCache`])
//! - **State mapping**: host numbers and remote symbols for modes and
//!   operating states, and operating-state inference for devices that do
//!   not report it
//! - **Never-failing host interface**: read failures are answered with the
//!   last known value, write failures are logged
//! - **Reconciliation**: declared devices are matched to persisted
//!   accessories by serial number; stale accessories are retired
//! - **Push updates**: thermostats may stream state snapshots over a
//!   WebSocket (`push` feature, enabled by default)
//!
//! # Supported Devices
//!
//! | Type | Operating state | Setpoint range | Humidity |
//! |------|-----------------|----------------|----------|
//! | `heatpump` | inferred | 17–30 °C | yes |
//! | `thermostat` | reported | declared (default 10–38 °C) | optional |
//! | `thermofridge` | reported | 0–30 °C | no |
//!
//! # Quick Start
//!
//! ```no_run
//! use thermobridge::accessory::DeviceAdapter;
//! use thermobridge::config::{AccessoryType, Device, EndpointConfig};
//! use thermobridge::types::Characteristic;
//!
//! #[tokio::main]
//! async fn main() -> thermobridge::Result<()> {
//!     let device = Device::new("Living Room", AccessoryType::Heatpump, "HP-1");
//!     let adapter = DeviceAdapter::from_device(&device, &EndpointConfig::default())?;
//!
//!     let temperature = adapter.get_current_temperature().await;
//!     let state = adapter.read(Characteristic::CurrentHeatingCoolingState).await;
//!     println!("{temperature} °C, {state:?}");
//!
//!     adapter.set_target_temperature(21.0).await;
//!     Ok(())
//! }
//! ```
//!
//! # Hosting
//!
//! A host implements [`registry::AccessoryHost`] and drives a
//! [`registry::DeviceRegistry`]:
//!
//! ```ignore
//! let mut registry = DeviceRegistry::new(host, config.endpoints.clone());
//! for accessory in persisted_accessories {
//!     registry.configure_accessory(accessory);
//! }
//! let summary = registry.reconcile_config(&config);
//! ```

pub mod accessory;
pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod types;

pub use accessory::{AccessoryInformation, ClimateAccessory, DeviceAdapter};
pub use config::{AccessoryType, Device, EndpointConfig, PlatformConfig};
pub use error::{ConfigError, Error, FetchError, ProtocolError, Result, WriteError};
pub use registry::{
    AccessoryHost, AccessoryUuid, DeviceRegistry, PlatformAccessory, ReconcileSummary,
};
pub use types::{Characteristic, CharacteristicValue, Mode, OperatingState};
