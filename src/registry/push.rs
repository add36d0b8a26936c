// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer side of the push channel.

#[cfg(feature = "push")]
use std::sync::Arc;

#[cfg(feature = "push")]
use tokio::{sync::mpsc, task::JoinHandle};

use super::{AccessoryHost, AccessoryUuid};
use crate::accessory::DeviceAdapter;
use crate::event::{EventBus, RegistryEvent};
use crate::state::StateSnapshot;

/// Applies one pushed frame and forwards the refreshed characteristics.
///
/// Returns the number of characteristics refreshed. Malformed frames are
/// logged and skipped.
#[cfg_attr(not(feature = "push"), allow(dead_code))]
pub(crate) fn apply_frame<H: AccessoryHost + ?Sized>(
    uuid: AccessoryUuid,
    adapter: &DeviceAdapter,
    host: &H,
    events: &EventBus,
    frame: &str,
) -> usize {
    let snapshot: StateSnapshot = match serde_json::from_str(frame) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(
                serial_number = %adapter.serial_number(),
                error = %e,
                "Ignoring malformed push frame"
            );
            return 0;
        }
    };

    let updates = adapter.apply_snapshot(&snapshot);
    for &(characteristic, value) in &updates {
        host.update_characteristic(uuid, characteristic, value);
        events.publish(RegistryEvent::CharacteristicPushed {
            uuid,
            characteristic,
            value,
        });
    }

    tracing::trace!(
        serial_number = %adapter.serial_number(),
        refreshed = updates.len(),
        "Applied push frame"
    );
    updates.len()
}

/// Spawns the single consumer task draining `frames` for one accessory.
#[cfg(feature = "push")]
pub(crate) fn spawn_consumer<H: AccessoryHost + 'static>(
    uuid: AccessoryUuid,
    adapter: Arc<DeviceAdapter>,
    host: Arc<H>,
    events: EventBus,
    mut frames: mpsc::Receiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            apply_frame(uuid, &adapter, host.as_ref(), &events, &frame);
        }
        tracing::debug!(
            serial_number = %adapter.serial_number(),
            "Push channel ended"
        );
    })
}
