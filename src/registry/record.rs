// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory records owned by the registry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::AccessoryUuid;
use crate::accessory::DeviceAdapter;
use crate::config::Device;

/// An accessory as persisted by the host.
///
/// The declared device travels with the accessory so that it can be rebuilt
/// after a restart, before the configuration is reconciled.
///
/// # Examples
///
/// ```
/// use thermobridge::config::{AccessoryType, Device};
/// use thermobridge::registry::PlatformAccessory;
///
/// let device = Device::new("Hall", AccessoryType::Thermostat, "TS-1");
/// let accessory = PlatformAccessory::new(device.clone());
///
/// assert_eq!(accessory.uuid, device.uuid());
/// assert_eq!(accessory.display_name, "Hall");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAccessory {
    /// Identity of the accessory.
    pub uuid: AccessoryUuid,
    /// Name shown by the host.
    pub display_name: String,
    /// The declaration the accessory was created from.
    pub device: Device,
}

impl PlatformAccessory {
    /// Creates the accessory for a declared device.
    #[must_use]
    pub fn new(device: Device) -> Self {
        Self {
            uuid: device.uuid(),
            display_name: device.name.clone(),
            device,
        }
    }
}

/// Background tasks feeding an accessory; aborted on drop.
#[derive(Debug, Default)]
pub(crate) struct PushTasks(Vec<JoinHandle<()>>);

impl PushTasks {
    pub(crate) fn new(tasks: Vec<JoinHandle<()>>) -> Self {
        Self(tasks)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for PushTasks {
    fn drop(&mut self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

/// A persisted accessory paired with its live adapter.
///
/// The adapter is absent when the persisted declaration can no longer be
/// bridged; such a record is inert until it is rebuilt or retired.
#[derive(Debug)]
pub(crate) struct AccessoryRecord {
    pub(crate) accessory: PlatformAccessory,
    pub(crate) adapter: Option<Arc<DeviceAdapter>>,
    pub(crate) push: PushTasks,
}

impl AccessoryRecord {
    pub(crate) fn live(
        accessory: PlatformAccessory,
        adapter: Arc<DeviceAdapter>,
        push: PushTasks,
    ) -> Self {
        Self {
            accessory,
            adapter: Some(adapter),
            push,
        }
    }

    pub(crate) fn inert(accessory: PlatformAccessory) -> Self {
        Self {
            accessory,
            adapter: None,
            push: PushTasks::default(),
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.adapter.is_some()
    }

    /// Binds a freshly built adapter to an inert record.
    pub(crate) fn bind(&mut self, adapter: Arc<DeviceAdapter>, push: PushTasks) {
        self.adapter = Some(adapter);
        self.push = push;
    }
}
