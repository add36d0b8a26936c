// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of declared devices against host accessories.
//!
//! The host persists accessories between runs. At startup it hands each one
//! back through [`DeviceRegistry::configure_accessory`], then the declared
//! devices are reconciled against them with [`DeviceRegistry::reconcile`]:
//!
//! - a declared device whose accessory exists is kept as-is
//! - a declared device without an accessory gets a new one
//! - an accessory whose device is no longer declared is retired
//!
//! Accessory identity is derived from the serial number (see
//! [`AccessoryUuid`]), so running the same reconciliation twice changes
//! nothing.

mod accessory_uuid;
mod host;
mod push;
mod record;

pub use accessory_uuid::AccessoryUuid;
pub use host::AccessoryHost;
pub use record::PlatformAccessory;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::accessory::DeviceAdapter;
use crate::config::{Device, EndpointConfig, PlatformConfig};
use crate::error::Error;
use crate::event::{EventBus, RegistryEvent};
use record::{AccessoryRecord, PushTasks};

/// A declared device that could not be bridged.
#[derive(Debug)]
pub struct RegistrationFailure {
    /// Serial number of the device, when the declaration could be decoded.
    pub serial_number: Option<String>,
    /// Why the device was skipped.
    pub error: Error,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileSummary {
    /// Existing accessories kept for declared devices.
    pub restored: Vec<AccessoryUuid>,
    /// Accessories created and registered in this pass.
    pub added: Vec<AccessoryUuid>,
    /// Accessories unregistered in this pass.
    pub retired: Vec<AccessoryUuid>,
    /// Declared devices skipped in this pass.
    pub failed: Vec<RegistrationFailure>,
}

impl ReconcileSummary {
    /// Returns `true` if the pass neither added nor retired anything.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.retired.is_empty()
    }
}

/// Owner of every accessory exposed to the host.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use thermobridge::config::PlatformConfig;
/// use thermobridge::registry::{AccessoryHost, DeviceRegistry};
///
/// fn start<H: AccessoryHost + 'static>(host: Arc<H>) -> thermobridge::Result<()> {
///     let config = PlatformConfig::from_path("config.json")?;
///     let mut registry = DeviceRegistry::new(host, config.endpoints.clone());
///
///     // Persisted accessories would be handed back here first.
///     let summary = registry.reconcile_config(&config);
///     for failure in &summary.failed {
///         eprintln!("skipped {:?}: {}", failure.serial_number, failure.error);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct DeviceRegistry<H> {
    host: Arc<H>,
    endpoints: EndpointConfig,
    records: HashMap<AccessoryUuid, AccessoryRecord>,
    events: EventBus,
}

impl<H: AccessoryHost + 'static> DeviceRegistry<H> {
    /// Creates an empty registry bridging devices to `host`.
    #[must_use]
    pub fn new(host: Arc<H>, endpoints: EndpointConfig) -> Self {
        Self {
            host,
            endpoints,
            records: HashMap::new(),
            events: EventBus::new(),
        }
    }

    /// Subscribes to registry events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Returns the endpoint settings new adapters are built with.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Returns the number of accessories, inert ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the registry holds no accessory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the identities of all accessories, sorted.
    #[must_use]
    pub fn uuids(&self) -> Vec<AccessoryUuid> {
        let mut uuids: Vec<_> = self.records.keys().copied().collect();
        uuids.sort_unstable();
        uuids
    }

    /// Returns the live adapter of an accessory.
    #[must_use]
    pub fn adapter(&self, uuid: AccessoryUuid) -> Option<Arc<DeviceAdapter>> {
        self.records.get(&uuid)?.adapter.clone()
    }

    /// Returns a persisted accessory.
    #[must_use]
    pub fn accessory(&self, uuid: AccessoryUuid) -> Option<&PlatformAccessory> {
        self.records.get(&uuid).map(|r| &r.accessory)
    }

    /// Takes back an accessory persisted by the host.
    ///
    /// The adapter is rebuilt from the persisted declaration and attached.
    /// If that fails, the accessory is still tracked, without an adapter, so
    /// that a later reconciliation can rebuild or retire it.
    ///
    /// Must be called from within a tokio runtime when the accessory has a
    /// push channel.
    pub fn configure_accessory(&mut self, accessory: PlatformAccessory) {
        let uuid = accessory.uuid;
        tracing::info!(
            display_name = %accessory.display_name,
            uuid = %uuid,
            "Loading accessory from cache"
        );

        let record = match DeviceAdapter::from_device(&accessory.device, &self.endpoints) {
            Ok(adapter) => {
                let adapter = Arc::new(adapter);
                let push = self.bind(&accessory, &adapter);
                AccessoryRecord::live(accessory, adapter, push)
            }
            Err(e) => {
                tracing::warn!(
                    display_name = %accessory.display_name,
                    uuid = %uuid,
                    error = %e,
                    "Cached accessory cannot be rebuilt, keeping it inert"
                );
                self.events.publish(RegistryEvent::RegistrationFailed {
                    serial_number: Some(accessory.device.serial_number.clone()),
                    error: e.to_string(),
                });
                AccessoryRecord::inert(accessory)
            }
        };

        self.records.insert(uuid, record);
    }

    /// Reconciles the accessories against the declared devices.
    ///
    /// Accessories of declared devices are kept untouched. New devices get
    /// an accessory, registered with the host in one batch. Accessories of
    /// devices no longer declared are unregistered in one batch. A device
    /// that cannot be bridged is reported in the summary and does not
    /// affect the others.
    pub fn reconcile(&mut self, devices: &[Device]) -> ReconcileSummary {
        self.reconcile_declared(devices, &HashSet::new())
    }

    /// Decodes the declared devices of `config` and reconciles them.
    ///
    /// Malformed declarations are reported first in the summary. An entry
    /// that does not decode but still names a serial number keeps its
    /// existing accessory: the device is still declared, so it is not
    /// retired.
    pub fn reconcile_config(&mut self, config: &PlatformConfig) -> ReconcileSummary {
        let mut devices = Vec::new();
        let mut malformed = Vec::new();
        let mut kept = HashSet::new();
        for (index, entry) in config.devices().into_iter().enumerate() {
            match entry {
                Ok(device) => devices.push(device),
                Err(e) => {
                    let serial_number = config.serial_number_at(index).map(str::to_string);
                    if let Some(serial) = &serial_number {
                        kept.insert(AccessoryUuid::from_serial_number(serial));
                    }
                    tracing::warn!(
                        serial_number = serial_number.as_deref().unwrap_or("unknown"),
                        error = %e,
                        "Skipping malformed device declaration"
                    );
                    self.events.publish(RegistryEvent::RegistrationFailed {
                        serial_number: serial_number.clone(),
                        error: e.to_string(),
                    });
                    malformed.push(RegistrationFailure {
                        serial_number,
                        error: e.into(),
                    });
                }
            }
        }

        let mut summary = self.reconcile_declared(&devices, &kept);
        malformed.append(&mut summary.failed);
        summary.failed = malformed;
        summary
    }

    /// Reconciles against `devices`; accessories in `kept` are never retired.
    fn reconcile_declared(
        &mut self,
        devices: &[Device],
        kept: &HashSet<AccessoryUuid>,
    ) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        let mut declared = HashSet::new();
        let mut created = Vec::new();

        for device in devices {
            let uuid = device.uuid();
            if !declared.insert(uuid) {
                tracing::warn!(
                    serial_number = %device.serial_number,
                    "Duplicate serial number, keeping the first declaration"
                );
                continue;
            }

            match self.records.get(&uuid).map(AccessoryRecord::is_live) {
                Some(true) => {
                    tracing::info!(
                        display_name = %device.name,
                        uuid = %uuid,
                        "Restoring accessory from cache"
                    );
                    summary.restored.push(uuid);
                    self.events.publish(RegistryEvent::AccessoryRestored {
                        uuid,
                        serial_number: device.serial_number.clone(),
                    });
                }
                Some(false) => self.rebuild(device, &mut summary),
                None => {
                    if let Some(accessory) = self.create(device, &mut summary) {
                        created.push(accessory);
                    }
                }
            }
        }

        if !created.is_empty() {
            self.host.register_accessories(&created);
        }

        let mut stale: Vec<_> = self
            .records
            .keys()
            .filter(|uuid| !declared.contains(*uuid) && !kept.contains(*uuid))
            .copied()
            .collect();
        stale.sort_unstable();

        let mut retired = Vec::with_capacity(stale.len());
        for uuid in stale {
            if let Some(record) = self.records.remove(&uuid) {
                tracing::info!(
                    display_name = %record.accessory.display_name,
                    uuid = %uuid,
                    "Removing no longer declared accessory"
                );
                summary.retired.push(uuid);
                self.events
                    .publish(RegistryEvent::AccessoryRetired { uuid });
                // Dropping the record aborts its push tasks.
                retired.push(record.accessory);
            }
        }

        if !retired.is_empty() {
            self.host.unregister_accessories(&retired);
        }

        tracing::debug!(
            restored = summary.restored.len(),
            added = summary.added.len(),
            retired = summary.retired.len(),
            failed = summary.failed.len(),
            "Reconciliation complete"
        );
        summary
    }

    fn create(
        &mut self,
        device: &Device,
        summary: &mut ReconcileSummary,
    ) -> Option<PlatformAccessory> {
        let adapter = match DeviceAdapter::from_device(device, &self.endpoints) {
            Ok(adapter) => Arc::new(adapter),
            Err(e) => {
                self.fail(device, e, summary);
                return None;
            }
        };

        let accessory = PlatformAccessory::new(device.clone());
        let uuid = accessory.uuid;
        tracing::info!(
            display_name = %accessory.display_name,
            uuid = %uuid,
            accessory_type = %adapter.kind(),
            "Adding new accessory"
        );

        let push = self.bind(&accessory, &adapter);
        self.records.insert(
            uuid,
            AccessoryRecord::live(accessory.clone(), adapter, push),
        );
        summary.added.push(uuid);
        self.events.publish(RegistryEvent::AccessoryAdded {
            uuid,
            serial_number: device.serial_number.clone(),
        });
        Some(accessory)
    }

    /// Gives an inert accessory an adapter built from the current declaration.
    fn rebuild(&mut self, device: &Device, summary: &mut ReconcileSummary) {
        let uuid = device.uuid();
        let adapter = match DeviceAdapter::from_device(device, &self.endpoints) {
            Ok(adapter) => Arc::new(adapter),
            Err(e) => {
                self.fail(device, e, summary);
                return;
            }
        };

        let Some(accessory) = self.records.get(&uuid).map(|r| r.accessory.clone()) else {
            return;
        };
        tracing::info!(
            display_name = %device.name,
            uuid = %uuid,
            "Restoring accessory from cache"
        );
        let push = self.bind(&accessory, &adapter);
        if let Some(record) = self.records.get_mut(&uuid) {
            record.bind(adapter, push);
        }
        summary.restored.push(uuid);
        self.events.publish(RegistryEvent::AccessoryRestored {
            uuid,
            serial_number: device.serial_number.clone(),
        });
    }

    fn fail(&self, device: &Device, error: Error, summary: &mut ReconcileSummary) {
        tracing::error!(
            display_name = %device.name,
            serial_number = %device.serial_number,
            error = %error,
            "Failed to register device"
        );
        self.events.publish(RegistryEvent::RegistrationFailed {
            serial_number: Some(device.serial_number.clone()),
            error: error.to_string(),
        });
        summary.failed.push(RegistrationFailure {
            serial_number: Some(device.serial_number.clone()),
            error,
        });
    }

    /// Attaches `adapter` to the host and starts its push channel, if any.
    fn bind(&self, accessory: &PlatformAccessory, adapter: &Arc<DeviceAdapter>) -> PushTasks {
        self.host.attach(accessory, adapter);
        self.start_push(accessory.uuid, adapter)
    }

    #[cfg(feature = "push")]
    fn start_push(&self, uuid: AccessoryUuid, adapter: &Arc<DeviceAdapter>) -> PushTasks {
        let Some(url) = adapter.push_url() else {
            return PushTasks::default();
        };
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!(
                serial_number = %adapter.serial_number(),
                "No async runtime, push channel not started"
            );
            return PushTasks::default();
        }

        let (frames, reader) = crate::protocol::PushChannel::spawn(url).into_parts();
        let consumer = push::spawn_consumer(
            uuid,
            Arc::clone(adapter),
            Arc::clone(&self.host),
            self.events.clone(),
            frames,
        );
        PushTasks::new(vec![reader, consumer])
    }

    #[cfg(not(feature = "push"))]
    fn start_push(&self, _uuid: AccessoryUuid, adapter: &Arc<DeviceAdapter>) -> PushTasks {
        if adapter.push_url().is_some() {
            tracing::warn!(
                serial_number = %adapter.serial_number(),
                "Built without the push feature, ignoring pushUrl"
            );
        }
        PushTasks::default()
    }
}
